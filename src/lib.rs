pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;
pub mod upload;

use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the gallery router. Every request goes through [`handlers::dispatch`].
pub fn app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.api.max_request_size_bytes);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        .fallback(handlers::dispatch)
        .with_state(state)
        .layer(body_limit);

    if request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    }
}
