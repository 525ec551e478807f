//! Fixture Proxy Binary
//!
//! Runs the fixture proxy for a test session: the echo host and mock routes
//! are answered locally, all other traffic goes to the real network.

use clap::Parser;
use fixture_core::{
    load_routes, CertificateAuthority, InterceptMode, ProxyConfig, ProxyServer,
};
use std::future::Future;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long, env = "FIXTURE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on for HTTP/HTTPS traffic
    #[arg(long, env = "FIXTURE_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Port to listen on for HTTP/HTTPS traffic
    #[arg(long, env = "FIXTURE_LISTEN_PORT")]
    pub listen_port: Option<u16>,

    /// Port to expose the Admin API (health/metrics), 0 disables it
    #[arg(long, env = "FIXTURE_ADMIN_PORT")]
    pub admin_port: Option<u16>,

    /// Directory holding the CA certificate and key
    #[arg(long, env = "FIXTURE_CA_DIR")]
    pub ca_dir: Option<PathBuf>,

    /// Requests to this host are echoed back
    #[arg(long, env = "FIXTURE_ECHO_HOST")]
    pub echo_host: Option<String>,

    /// full, routes-only or passthrough
    #[arg(long, env = "FIXTURE_MODE")]
    pub mode: Option<InterceptMode>,

    /// JSON file with additional mock routes
    #[arg(long, env = "FIXTURE_ROUTES")]
    pub routes: Option<PathBuf>,

    /// Drop the built-in mock routes
    #[arg(long, env = "FIXTURE_NO_DEFAULT_ROUTES")]
    pub no_default_routes: bool,
}

/// Merge the configuration file (if any) with command-line overrides
pub fn load_config(args: &Args) -> fixture_core::Result<ProxyConfig> {
    let mut config = match &args.config {
        Some(path) => ProxyConfig::from_file(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(addr) = &args.listen_addr {
        config.listen_address = addr.clone();
    }
    if let Some(port) = args.listen_port {
        config.listen_port = port;
    }
    if let Some(port) = args.admin_port {
        config.admin_port = port;
    }
    if let Some(dir) = &args.ca_dir {
        config.certificate_config.cert_store_path = dir.to_string_lossy().into_owned();
    }
    if let Some(host) = &args.echo_host {
        config.echo_host = host.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if args.no_default_routes {
        config.default_routes = false;
    }
    if let Some(path) = &args.routes {
        config.routes.extend(load_routes(path)?);
    }

    Ok(config)
}

pub async fn run_fixture<F>(args: Args, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Logging should be initialized by the caller (main or test)

    let config = load_config(&args)?;

    tracing::info!("Starting Fixture Proxy...");
    tracing::info!("  Listen: {}:{}", config.listen_address, config.listen_port);
    tracing::info!("  Admin:  {}", config.admin_port);
    tracing::info!("  Mode:   {:?}", config.mode);
    tracing::info!("  Echo:   {}", config.echo_host);

    let ca = CertificateAuthority::new(Path::new(&config.certificate_config.cert_store_path))?;
    let server = ProxyServer::new(config, ca)?;

    server.run_until(shutdown).await?;
    Ok(())
}
