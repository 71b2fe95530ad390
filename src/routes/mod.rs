//! HTTP routes for Mallard
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod chat;
pub mod health;
pub mod info;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(info::service_info))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/v1/chat/completions", post(chat::chat_completions))
        .route("/v1/models", get(models::list_models))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
