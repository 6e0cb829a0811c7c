use crate::common::HealthStatus;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const QUERY_RANGE_PATH: &str = "/api/v1/query_range";

/// One series served by the fake backend. Values are kept as raw strings so
/// callers can serve samples that do not parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FakeSeries {
    pub labels: BTreeMap<String, String>,
    pub values: Vec<String>,
}

impl FakeSeries {
    pub fn new(values: &[f64]) -> Self {
        Self {
            labels: BTreeMap::new(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn raw(values: &[&str]) -> Self {
        Self {
            labels: BTreeMap::new(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// How the fake backend answers range queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    /// Serve the configured series with `status: success`.
    Serve,
    /// Answer HTTP 200 with a `status: error` envelope.
    ReportError { error_type: String, message: String },
    /// Answer with the given HTTP status and an empty body.
    HttpStatus(u16),
    /// Answer HTTP 200 with a body that is not JSON.
    Garbage,
}

/// A range query as received by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub query: String,
    pub start: String,
    pub end: String,
    pub step: String,
}

#[derive(Clone)]
pub struct FakePrometheus {
    start_time: Instant,
    series: Arc<RwLock<Vec<FakeSeries>>>,
    behavior: Arc<RwLock<Behavior>>,
    requests: Arc<RwLock<Vec<RangeRequest>>>,
}

impl FakePrometheus {
    pub fn new(series: Vec<FakeSeries>) -> Self {
        Self {
            start_time: Instant::now(),
            series: Arc::new(RwLock::new(series)),
            behavior: Arc::new(RwLock::new(Behavior::Serve)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Five identical series `[1, 2, 3, 4]`.
    pub fn with_defaults() -> Self {
        let series = (0..5)
            .map(|i| {
                FakeSeries::new(&[1.0, 2.0, 3.0, 4.0]).label("instance", format!("store-{}", i))
            })
            .collect();
        Self::new(series)
    }

    pub async fn set_series(&self, series: Vec<FakeSeries>) {
        *self.series.write().await = series;
    }

    pub async fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.write().await = behavior;
    }

    pub async fn requests(&self) -> Vec<RangeRequest> {
        self.requests.read().await.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route(QUERY_RANGE_PATH, get(query_range))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    /// Serves the router on `addr` in a background task and returns the bound
    /// address. Bind to port 0 for an ephemeral port.
    pub async fn spawn(&self, addr: &str) -> anyhow::Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        let app = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fake Prometheus stopped: {}", e);
            }
        });
        info!("Fake Prometheus listening on {}", local);
        Ok(local)
    }
}

async fn health_check(State(state): State<FakePrometheus>) -> Json<HealthStatus> {
    let served = state.requests.read().await.len();
    Json(HealthStatus::healthy(
        state.start_time.elapsed().as_secs(),
        served,
    ))
}

async fn query_range(
    State(state): State<FakePrometheus>,
    Query(request): Query<RangeRequest>,
) -> Response {
    info!(
        "Range query '{}' [{}, {}) step {}",
        request.query, request.start, request.end, request.step
    );
    state.requests.write().await.push(request.clone());

    match state.behavior.read().await.clone() {
        Behavior::Serve => {
            let start = request.start.parse::<f64>().unwrap_or(0.0);
            let step = request.step.parse::<f64>().unwrap_or(30.0);
            let series = state.series.read().await;
            let result: Vec<_> = series
                .iter()
                .map(|s| {
                    let values: Vec<_> = s
                        .values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| json!([start + step * i as f64, v]))
                        .collect();
                    json!({ "metric": s.labels, "values": values })
                })
                .collect();

            Json(json!({
                "status": "success",
                "data": { "resultType": "matrix", "result": result }
            }))
            .into_response()
        }
        Behavior::ReportError {
            error_type,
            message,
        } => Json(json!({
            "status": "error",
            "errorType": error_type,
            "error": message,
        }))
        .into_response(),
        Behavior::HttpStatus(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Behavior::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}
