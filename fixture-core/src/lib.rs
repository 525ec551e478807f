//! Fixture Proxy Core Library
//!
//! An intercepting HTTP/HTTPS proxy for automated tests. Requests to the echo
//! host are mirrored back, URLs in the route table get mock responses, and
//! everything else is forwarded to the real network.

pub mod admin;
pub mod ca;
pub mod flow;
pub mod handlers;
pub mod interceptor;
pub mod matcher;
pub mod mocks;
pub mod proxy;
pub mod routes;

/// Configuration types and utilities
pub mod config;

/// Error types for fixture proxy operations
pub mod error;

pub use admin::{Metrics, MetricsSnapshot};
pub use ca::CertificateAuthority;
pub use config::{
    load_routes, CertificateConfig, InterceptMode, ProxyConfig, ProxyStartupConfig, RouteConfig,
    DEFAULT_ECHO_HOST,
};
pub use error::FixtureError;
pub use flow::{Flow, FlowRequest, FlowResponse};
pub use handlers::FixtureHandler;
pub use interceptor::{Interceptor, Outcome};
pub use matcher::{url_matches, UrlPattern};
pub use proxy::ProxyServer;
pub use routes::{MockHandler, RouteTable, StaticResponse};

/// Result type alias for fixture proxy operations
pub type Result<T> = std::result::Result<T, FixtureError>;
