//! Configuration types and utilities

use crate::{error::FixtureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Host whose requests are mirrored back by default
pub const DEFAULT_ECHO_HOST: &str = "echo.lan";

/// Static Proxy Startup Configuration
/// These settings are set at startup and do not change during runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyStartupConfig {
    /// Address to listen on
    pub listen_address: String,
    /// Port to listen on
    pub listen_port: u16,
    /// Admin API port, 0 disables the admin API
    pub admin_port: u16,
    /// Certificate configuration
    pub certificate_config: CertificateConfig,
    /// Which interception behaviours are active
    pub mode: InterceptMode,
    /// Requests to this host are echoed back
    pub echo_host: String,
    /// Keep the built-in mock routes in front of the configured ones
    pub default_routes: bool,
    /// Additional static mock routes
    pub routes: Vec<RouteConfig>,
}

impl Default for ProxyStartupConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 8080,
            admin_port: 9091,
            certificate_config: CertificateConfig::default(),
            mode: InterceptMode::default(),
            echo_host: DEFAULT_ECHO_HOST.to_string(),
            default_routes: true,
            routes: Vec::new(),
        }
    }
}

impl ProxyStartupConfig {
    /// Load a configuration file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            FixtureError::Configuration(format!("Invalid config {}: {}", path.display(), e))
        })
    }
}

/// Certificate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    /// Directory holding `ca.pem`/`ca.key`, generated on first start
    pub cert_store_path: String,
    /// Number of leaf certificates hudsucker keeps cached
    pub cache_size: u64,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            cert_store_path: "./certs".to_string(),
            cache_size: 1000,
        }
    }
}

/// Which interception behaviours are active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterceptMode {
    /// Echo host and route table
    #[default]
    Full,
    /// Route table only
    RoutesOnly,
    /// Never answer, forward everything
    Passthrough,
}

impl InterceptMode {
    pub fn echo_enabled(self) -> bool {
        self == InterceptMode::Full
    }

    pub fn routes_enabled(self) -> bool {
        self != InterceptMode::Passthrough
    }
}

impl std::str::FromStr for InterceptMode {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(InterceptMode::Full),
            "routes-only" | "routes" => Ok(InterceptMode::RoutesOnly),
            "passthrough" | "pass-through" => Ok(InterceptMode::Passthrough),
            other => Err(FixtureError::Configuration(format!(
                "Unknown intercept mode '{}'",
                other
            ))),
        }
    }
}

/// A static mock route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Exact URL, `prefix*`, or bare host
    pub pattern: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Strings are sent verbatim, other values as JSON
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

fn default_status() -> u16 {
    200
}

/// Read a JSON array of routes
pub fn load_routes(path: &Path) -> Result<Vec<RouteConfig>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        FixtureError::Configuration(format!("Invalid routes file {}: {}", path.display(), e))
    })
}

/// Name used by the server and CLI for [`ProxyStartupConfig`]
pub type ProxyConfig = ProxyStartupConfig;
