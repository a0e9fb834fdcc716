//! API routes and handlers

mod generate;
mod health;
mod player;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let output_dir = state.engine.output_dir().clone();

    Router::new()
        .route("/generate_music", post(generate::generate_music))
        .route("/audio_player/:filename", get(player::audio_player))
        .route("/health", get(health::health_check))
        // Generated audio, served read-only
        .nest_service("/static", ServeDir::new(output_dir))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
