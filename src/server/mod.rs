pub mod handlers;
mod types;

pub use handlers::AppState;
pub use types::*;

use crate::{Result, config::Config, generation::GenerationService};
use axum::{Router, routing::get};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::generate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let service = GenerationService::from_config(&config);

    let app_state = AppState {
        service: Arc::new(service),
        static_dir: PathBuf::from(&config.server.static_dir),
    };

    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
