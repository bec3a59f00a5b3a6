mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::flyover::FlyoverResolver;

pub fn build_router(resolver: FlyoverResolver) -> Router {
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route("/api/ip", get(handlers::my_ip))
        .route("/api/coords", get(handlers::coords))
        .route("/api/flyovers", get(handlers::flyovers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resolver: FlyoverResolver) -> std::io::Result<()> {
    let app = build_router(resolver);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    eprintln!("  ISS flyover server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
