//! Service info endpoint
//!
//! Static informational response on the root path.

use axum::Json;
use serde::Serialize;

/// Service information
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub message: &'static str,
}

/// Root informational endpoint
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "mallard",
        version: env!("CARGO_PKG_VERSION"),
        message: "OpenAI-compatible chat completions proxy. POST /v1/chat/completions to use it.",
    })
}
