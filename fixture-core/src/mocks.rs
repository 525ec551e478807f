//! Built-in mock responses

use crate::flow::{FlowRequest, FlowResponse};
use hudsucker::hyper::StatusCode;
use serde::Serialize;

/// Header marking a synthesized response
pub const MOCK_MARKER_HEADER: &str = "x-mock-response";

#[derive(Debug, Serialize)]
struct TestMockBody<'a> {
    message: &'a str,
    path: &'a str,
    method: &'a str,
}

/// Mock served for `/test`: describes the request it answers
pub fn test_mock(req: &FlowRequest) -> FlowResponse {
    let body = TestMockBody {
        message: "This is a mocked response",
        path: &req.path,
        method: req.method.as_str(),
    };
    FlowResponse::json(StatusCode::OK, &body).with_header(MOCK_MARKER_HEADER, "true")
}

/// Mirror the request back as its own response
pub fn echo(req: &FlowRequest) -> FlowResponse {
    FlowResponse::make(StatusCode::OK, req.body.clone(), req.headers.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hudsucker::hyper::{header, HeaderMap, Method, Uri};

    #[test]
    fn test_test_mock_shape() {
        let res = test_mock(&FlowRequest::get("https://server.lan/test"));

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(res.headers[MOCK_MARKER_HEADER], "true");

        let body: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(body["path"], "/test");
        assert_eq!(body["method"], "GET");
        assert!(body["message"].is_string());
    }

    #[test]
    fn test_echo_mirrors_body_and_headers() {
        let uri: Uri = "http://echo.lan/roundtrip".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-trace", "abc123".parse().unwrap());
        headers.append("x-multi", "one".parse().unwrap());
        headers.append("x-multi", "two".parse().unwrap());

        let req = FlowRequest::from_parts(
            Method::PUT,
            &uri,
            headers.clone(),
            Bytes::from_static(b"payload"),
        );
        let res = echo(&req);

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers, headers);
        assert_eq!(&res.body[..], b"payload");
    }
}
