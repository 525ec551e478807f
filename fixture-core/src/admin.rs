use crate::{interceptor::Outcome, Result};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::info;

/// Shared state for metrics
#[derive(Debug, Default)]
pub struct Metrics {
    pub total_requests: AtomicU64,
    pub echoed: AtomicU64,
    pub mocked: AtomicU64,
    pub passed_through: AtomicU64,
}

impl Metrics {
    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Echoed => &self.echoed,
            Outcome::Mocked => &self.mocked,
            Outcome::PassedThrough => &self.passed_through,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            echoed: self.echoed.load(Ordering::Relaxed),
            mocked: self.mocked.load(Ordering::Relaxed),
            passed_through: self.passed_through.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub echoed: u64,
    pub mocked: u64,
    pub passed_through: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(move || metrics_handler(metrics)))
}

pub async fn start_admin_server(addr: SocketAddr, metrics: Arc<Metrics>) -> Result<()> {
    let app = router(metrics);

    info!("Starting Admin API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        crate::error::FixtureError::Network(format!("Failed to bind admin address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::FixtureError::Network(format!("Admin server failed: {}", e)))?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn metrics_handler(metrics: Arc<Metrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let metrics = Metrics::default();
        metrics.total_requests.fetch_add(3, Ordering::Relaxed);
        metrics.record(Outcome::Echoed);
        metrics.record(Outcome::Mocked);
        metrics.record(Outcome::PassedThrough);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                total_requests: 3,
                echoed: 1,
                mocked: 1,
                passed_through: 1,
            }
        );
    }
}
