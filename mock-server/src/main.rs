use std::sync::Arc;

use mock_server::{MockResponse, Script};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let status = std::env::var("MOCK_STATUS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(200);
    let body = std::env::var("MOCK_BODY").unwrap_or_default();
    let script = Script::with_fallback(MockResponse::new().status(status).body(body));

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, status, "listening");
    mock_server::run(listener, Arc::new(script)).await
}
