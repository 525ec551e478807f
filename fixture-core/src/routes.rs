//! Static route table mapping URL patterns to mock handlers

use crate::{
    config::RouteConfig,
    error::FixtureError,
    flow::{FlowRequest, FlowResponse},
    matcher::UrlPattern,
    mocks, Result,
};
use bytes::Bytes;
use hudsucker::hyper::{
    header::{self, HeaderName, HeaderValue},
    HeaderMap, StatusCode,
};
use std::sync::Arc;

/// Produces the mock response for a matched request
pub trait MockHandler: Send + Sync {
    fn respond(&self, req: &FlowRequest) -> FlowResponse;
}

impl<F> MockHandler for F
where
    F: Fn(&FlowRequest) -> FlowResponse + Send + Sync,
{
    fn respond(&self, req: &FlowRequest) -> FlowResponse {
        self(req)
    }
}

/// Canned response loaded from configuration
#[derive(Debug, Clone)]
pub struct StaticResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StaticResponse {
    pub fn from_config(route: &RouteConfig) -> Result<Self> {
        let status = StatusCode::from_u16(route.status).map_err(|_| {
            FixtureError::Configuration(format!(
                "Invalid status {} for route '{}'",
                route.status, route.pattern
            ))
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &route.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                FixtureError::Configuration(format!(
                    "Invalid header name '{}' for route '{}'",
                    name, route.pattern
                ))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                FixtureError::Configuration(format!(
                    "Invalid value for header '{}' on route '{}'",
                    name, route.pattern
                ))
            })?;
            headers.append(name, value);
        }

        let body = match &route.body {
            None => Bytes::new(),
            Some(serde_json::Value::String(text)) => Bytes::from(text.clone()),
            Some(value) => {
                if !headers.contains_key(header::CONTENT_TYPE) {
                    headers.insert(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    );
                }
                Bytes::from(serde_json::to_vec(value)?)
            }
        };

        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

impl MockHandler for StaticResponse {
    fn respond(&self, _req: &FlowRequest) -> FlowResponse {
        FlowResponse::make(self.status, self.body.clone(), self.headers.clone())
            .with_header(mocks::MOCK_MARKER_HEADER, "true")
    }
}

struct Route {
    pattern: UrlPattern,
    handler: Arc<dyn MockHandler>,
}

/// Ordered pattern -> handler table; the first matching pattern wins
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in mocks
    pub fn builtin() -> Self {
        Self::new().route("https://server.lan/test", mocks::test_mock)
    }

    /// Built-in mocks (optionally) followed by the configured static routes
    pub fn from_config(include_builtin: bool, routes: &[RouteConfig]) -> Result<Self> {
        let mut table = if include_builtin {
            Self::builtin()
        } else {
            Self::new()
        };
        for route in routes {
            table = table.route(&route.pattern, StaticResponse::from_config(route)?);
        }
        Ok(table)
    }

    pub fn route(mut self, pattern: &str, handler: impl MockHandler + 'static) -> Self {
        self.routes.push(Arc::new(Route {
            pattern: UrlPattern::parse(pattern),
            handler: Arc::new(handler),
        }));
        self
    }

    /// Find the handler for a request URL
    pub fn lookup(&self, url: &str, host: Option<&str>) -> Option<(&UrlPattern, &dyn MockHandler)> {
        self.routes
            .iter()
            .find(|r| r.pattern.matches(url, host))
            .map(|r| (&r.pattern, r.handler.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &UrlPattern> {
        self.routes.iter().map(|r| &r.pattern)
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}
