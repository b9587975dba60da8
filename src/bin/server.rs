//! NDM Section HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use ndm_section::request::{run_request, SolveRequest, SolveResponse};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn solve(Json(request): Json<SolveRequest>) -> impl IntoResponse {
    match run_request(&request) {
        Ok(results) => (StatusCode::OK, Json(SolveResponse::ok(results))),
        Err(e) => {
            log::warn!("solve request failed: {}", e);
            (StatusCode::BAD_REQUEST, Json(SolveResponse::failed(e.to_string())))
        }
    }
}

fn bind_address() -> anyhow::Result<SocketAddr> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8086".to_string());
    Ok(format!("{}:{}", host, port).parse()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/solve", post(solve))
        .layer(cors);

    let addr = bind_address()?;
    println!("NDM Section Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Solve:        POST /api/v1/solve");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
