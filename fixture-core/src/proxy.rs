use crate::{
    admin::{start_admin_server, Metrics},
    ca::CertificateAuthority,
    config::{InterceptMode, ProxyConfig},
    error::FixtureError,
    handlers::FixtureHandler,
    interceptor::Interceptor,
    routes::RouteTable,
    Result,
};
use hudsucker::{certificate_authority::RcgenAuthority, rustls, ProxyBuilder};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ProxyServer {
    config: ProxyConfig,
    ca: CertificateAuthority,
    interceptor: Arc<Interceptor>,
    metrics: Arc<Metrics>,
}

impl ProxyServer {
    /// Build a server whose interceptor follows `config`
    pub fn new(config: ProxyConfig, ca: CertificateAuthority) -> Result<Self> {
        let routes = RouteTable::from_config(config.default_routes, &config.routes)?;
        if routes.is_empty() && config.mode == InterceptMode::RoutesOnly {
            warn!("Running in routes-only mode with an empty route table; every request passes through");
        }
        let interceptor = Interceptor::new(config.echo_host.clone(), routes).with_mode(config.mode);
        Ok(Self::with_interceptor(config, ca, interceptor))
    }

    pub fn with_interceptor(
        config: ProxyConfig,
        ca: CertificateAuthority,
        interceptor: Interceptor,
    ) -> Self {
        Self {
            config,
            ca,
            interceptor: Arc::new(interceptor),
            metrics: Arc::new(Metrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.config.listen_address, self.config.listen_port)
    }

    /// Admin API address: same interface as the proxy, `None` when disabled
    pub fn admin_addr(&self) -> Result<Option<SocketAddr>> {
        if self.config.admin_port == 0 {
            return Ok(None);
        }
        socket_addr(&self.config.listen_address, self.config.admin_port).map(Some)
    }

    /// Serve until the process exits
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listen_addr()?;
        info!(
            "Starting fixture proxy on {} (mode: {:?}, echo host: {}, routes: {:?})",
            addr,
            self.interceptor.mode(),
            self.config.echo_host,
            self.interceptor.routes()
        );

        if let Some(admin_addr) = self.admin_addr()? {
            let metrics = self.metrics.clone();
            tokio::spawn(async move {
                if let Err(e) = start_admin_server(admin_addr, metrics).await {
                    error!("Admin server failed: {}", e);
                }
            });
        }

        // Hudsucker/Rustls expects DER, not PEM.
        let private_key = rustls::PrivateKey(self.ca.get_ca_key_der());
        let ca_cert = rustls::Certificate(self.ca.get_ca_cert_der()?);

        let authority = RcgenAuthority::new(
            private_key,
            ca_cert,
            self.config.certificate_config.cache_size,
        )
        .map_err(|e| FixtureError::Certificate(format!("Failed to create CA authority: {}", e)))?;

        let handler = FixtureHandler::new(self.interceptor.clone(), self.metrics.clone());

        let proxy = ProxyBuilder::new()
            .with_addr(addr)
            .with_rustls_client()
            .with_ca(authority)
            .with_http_handler(handler)
            .build();

        proxy
            .start(shutdown)
            .await
            .map_err(|e| FixtureError::Network(format!("Proxy failed: {}", e)))?;

        info!("Fixture proxy on {} stopped", addr);
        Ok(())
    }
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let addr = format!("{}:{}", host, port);
    addr.parse()
        .map_err(|e| FixtureError::Configuration(format!("Invalid listen address {}: {}", addr, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn server(config: ProxyConfig) -> ProxyServer {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::new(dir.path()).unwrap();
        ProxyServer::new(config, ca).unwrap()
    }

    #[test]
    fn test_admin_binds_listen_address() {
        let server = server(ProxyConfig {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 18080,
            admin_port: 19091,
            ..Default::default()
        });

        assert_eq!(server.listen_addr().unwrap(), "127.0.0.1:18080".parse().unwrap());
        assert_eq!(
            server.admin_addr().unwrap(),
            Some("127.0.0.1:19091".parse().unwrap())
        );
    }

    #[test]
    fn test_admin_disabled_with_port_zero() {
        let server = server(ProxyConfig {
            admin_port: 0,
            ..Default::default()
        });
        assert_eq!(server.admin_addr().unwrap(), None);
    }

    #[test]
    fn test_invalid_listen_address() {
        let server = server(ProxyConfig {
            listen_address: "not an address".to_string(),
            ..Default::default()
        });
        assert!(server.listen_addr().unwrap_err().is_configuration());
    }

    #[test]
    fn test_new_rejects_invalid_route() {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::new(dir.path()).unwrap();
        let config = ProxyConfig {
            routes: vec![crate::config::RouteConfig {
                pattern: "server.lan".to_string(),
                status: 1000,
                headers: Default::default(),
                body: None,
            }],
            ..Default::default()
        };

        assert!(ProxyServer::new(config, ca).is_err());
    }
}
