//! Models endpoint
//!
//! Lists the single model served through the proxy.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Model information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

/// Models list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<Model>,
}

/// List available models.
///
/// Every request is served by the pinned upstream model, so the listing
/// has exactly one entry.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        object: "list".to_string(),
        data: vec![Model {
            id: state.config.upstream_model.clone(),
            object: "model".to_string(),
            created: 1692901427,
            owned_by: "system".to_string(),
        }],
    })
}
