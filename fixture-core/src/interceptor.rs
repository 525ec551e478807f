//! Request interceptor: echo, mock, or pass through.

use crate::{
    config::{InterceptMode, DEFAULT_ECHO_HOST},
    flow::Flow,
    mocks,
    routes::RouteTable,
};
use tracing::{debug, info};

/// What the interceptor did with a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Echoed,
    Mocked,
    PassedThrough,
}

/// The request hook.
///
/// Holds only read-only state, so a single instance is shared by every
/// connection the proxy serves.
#[derive(Debug, Clone)]
pub struct Interceptor {
    echo_host: String,
    routes: RouteTable,
    mode: InterceptMode,
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new(DEFAULT_ECHO_HOST, RouteTable::builtin())
    }
}

impl Interceptor {
    pub fn new(echo_host: impl Into<String>, routes: RouteTable) -> Self {
        Self {
            echo_host: echo_host.into().to_ascii_lowercase(),
            routes,
            mode: InterceptMode::Full,
        }
    }

    pub fn with_mode(mut self, mode: InterceptMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> InterceptMode {
        self.mode
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide whether to answer `flow` directly.
    ///
    /// Sets `flow.response` for the echo host and for URLs in the route
    /// table; leaves it `None` otherwise.
    pub fn request(&self, flow: &mut Flow) -> Outcome {
        let req = &flow.request;

        if self.mode.echo_enabled() && !req.host.is_empty() && req.host == self.echo_host {
            info!("Echoing request: {}", req.url);
            flow.response = Some(mocks::echo(req));
            return Outcome::Echoed;
        }

        if self.mode.routes_enabled() {
            if let Some((pattern, handler)) = self.routes.lookup(&req.url, Some(req.host.as_str())) {
                info!("Mocking request: {} (route {})", req.url, pattern);
                flow.response = Some(handler.respond(req));
                return Outcome::Mocked;
            }
        }

        debug!("Proxying request: {}", req.url);
        Outcome::PassedThrough
    }
}
