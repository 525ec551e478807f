use crate::admin::Metrics;
use crate::flow::{Flow, FlowRequest, FlowResponse};
use crate::interceptor::Interceptor;
use hudsucker::{
    hyper::{body, Body, Method, Request, Response},
    HttpContext, HttpHandler, RequestOrResponse,
};
use std::sync::{atomic::Ordering, Arc};
use tracing::{debug, warn};

/// Mounts the [`Interceptor`] into hudsucker.
///
/// hudsucker clones the handler per connection; the interceptor and metrics
/// are shared behind `Arc`.
#[derive(Clone)]
pub struct FixtureHandler {
    interceptor: Arc<Interceptor>,
    metrics: Arc<Metrics>,
}

impl FixtureHandler {
    pub fn new(interceptor: Arc<Interceptor>, metrics: Arc<Metrics>) -> Self {
        Self {
            interceptor,
            metrics,
        }
    }

    /// Buffer the request, run the interceptor, and either answer or forward.
    pub async fn intercept(&self, req: Request<Body>) -> RequestOrResponse {
        // Tunnel setup stays with hudsucker; the decrypted requests inside come back here.
        if req.method() == Method::CONNECT {
            debug!("Passing CONNECT {} to the proxy engine", req.uri());
            return RequestOrResponse::Request(req);
        }

        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let (parts, req_body) = req.into_parts();
        let bytes = match body::to_bytes(req_body).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read request body for {}: {}", parts.uri, e);
                Default::default()
            }
        };

        let mut flow = Flow::new(FlowRequest::from_parts(
            parts.method.clone(),
            &parts.uri,
            parts.headers.clone(),
            bytes.clone(),
        ));

        let outcome = self.interceptor.request(&mut flow);
        self.metrics.record(outcome);

        match flow.response {
            Some(response) => {
                debug!(
                    "Flow [{}] answered locally with status {}",
                    flow.id, response.status
                );
                RequestOrResponse::Response(into_hyper_response(response))
            }
            None => RequestOrResponse::Request(Request::from_parts(parts, Body::from(bytes))),
        }
    }
}

/// Convert a synthesized response into hyper's representation
pub fn into_hyper_response(response: FlowResponse) -> Response<Body> {
    let mut res = Response::new(Body::from(response.body));
    *res.status_mut() = response.status;
    *res.headers_mut() = response.headers;
    res
}

#[async_trait::async_trait]
impl HttpHandler for FixtureHandler {
    async fn handle_request(&mut self, _ctx: &HttpContext, req: Request<Body>) -> RequestOrResponse {
        self.intercept(req).await
    }

    async fn handle_response(&mut self, _ctx: &HttpContext, res: Response<Body>) -> Response<Body> {
        res
    }
}
