//! Flow model handed to the interceptor.
//!
//! A [`Flow`] pairs a fully buffered request with an optional response slot.
//! Leaving the slot empty lets the request continue to its real destination.

use bytes::Bytes;
use hudsucker::hyper::{
    header::{self, HeaderValue},
    HeaderMap, Method, StatusCode, Uri,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// Read-only view of an intercepted request
#[derive(Debug, Clone)]
pub struct FlowRequest {
    pub method: Method,
    /// Absolute URL, e.g. `https://server.lan/test?x=1`
    pub url: String,
    /// Lower-cased host without port
    pub host: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FlowRequest {
    /// Build a request view from its raw parts.
    ///
    /// The host is taken from the URI authority and falls back to the `Host`
    /// header for origin-form requests. The URL is rebuilt as absolute when the
    /// URI carries only a path, and the scheme's default port is dropped
    /// (hudsucker hands decrypted requests over as `https://host:443/...`).
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let host = uri
            .host()
            .map(str::to_string)
            .or_else(|| host_from_header(&headers))
            .unwrap_or_default()
            .to_ascii_lowercase();

        let path = uri.path().to_string();

        let raw = if uri.scheme().is_some() {
            uri.to_string()
        } else {
            let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
            format!("http://{}{}", host, path_and_query)
        };
        let url = pretty_url(&raw);

        Self {
            method,
            url,
            host,
            path,
            headers,
            body,
        }
    }

    /// Convenience constructor for a body-less request to `url`
    pub fn get(url: &str) -> Self {
        let uri: Uri = url.parse().unwrap_or_default();
        Self::from_parts(Method::GET, &uri, HeaderMap::new(), Bytes::new())
    }
}

/// Normalized form of `raw`: lower-case host, no default port.
/// Unparseable input is returned unchanged.
fn pretty_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => raw.to_string(),
    }
}

fn host_from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::HOST)?.to_str().ok()?;
    // Strip an optional port; bracketed IPv6 literals keep their brackets.
    let host = match value.rfind(':') {
        Some(idx) if !value[idx..].contains(']') => &value[..idx],
        _ => value,
    };
    Some(host.to_string())
}

/// Response synthesized by the interceptor
#[derive(Debug, Clone)]
pub struct FlowResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FlowResponse {
    pub fn make(status: StatusCode, body: impl Into<Bytes>, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Serialize `value` as the body and mark the response as JSON
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|e| {
            warn!("Failed to serialize JSON response body: {}", e);
            Vec::new()
        });
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self::make(status, body, headers)
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }
}

/// One request/response exchange
#[derive(Debug, Clone)]
pub struct Flow {
    pub id: String,
    pub request: FlowRequest,
    /// Set by the interceptor to short-circuit the request
    pub response: Option<FlowResponse>,
}

impl Flow {
    pub fn new(request: FlowRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request,
            response: None,
        }
    }
}
