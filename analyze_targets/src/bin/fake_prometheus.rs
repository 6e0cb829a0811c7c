use analyze_targets::FakePrometheus;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let addr =
        std::env::var("FAKE_PROMETHEUS_ADDR").unwrap_or_else(|_| "0.0.0.0:9090".to_string());
    let fake = FakePrometheus::with_defaults();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting fake Prometheus on {}", addr);
    info!("Endpoints:");
    info!("  GET /health              - Health check");
    info!("  GET /api/v1/query_range  - Range query (5 series of [1, 2, 3, 4])");

    axum::serve(listener, fake.router()).await?;

    Ok(())
}
