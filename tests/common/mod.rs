//! Shared test helpers
//!
//! Builds a real router around a config pointing at a wiremock backend.
#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use mallard::{routes, translate::TerminalFrameStyle, AppState, Config};
use serde_json::Value;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// The token the mock status endpoint hands out
pub const TOKEN: &str = "4-test-session-token";

/// Config pointing directly at the given backend URL
pub fn test_config(upstream_base: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_base_url: upstream_base.to_string(),
        fronting_enabled: false,
        fronting_base_url: upstream_base.to_string(),
        upstream_model: "gpt-3.5-turbo-0125".to_string(),
        terminal_frame: TerminalFrameStyle::Full,
        request_timeout_secs: 30,
    }
}

/// Spin up the full router for the given config
pub fn test_server(config: Config) -> TestServer {
    let state = Arc::new(AppState::new(config).expect("app state"));
    TestServer::new(routes::create_router(state)).expect("test server")
}

/// Mount the status endpoint issuing [`TOKEN`]
pub async fn mount_status(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/duckchat/v1/status"))
        .and(header("x-vqd-accept", "1"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-vqd-4", TOKEN))
        .mount(server)
        .await;
}

/// Mount the chat endpoint replying with the given SSE body
pub async fn mount_chat(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/duckchat/v1/chat"))
        .and(header("x-vqd-4", TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "text/event-stream"),
        )
        .mount(server)
        .await;
}

/// Format backend events into an SSE body, optionally terminated
pub fn sse_body(events: &[Value], terminated: bool) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
    }
    if terminated {
        body.push_str("data: [DONE]\n\n");
    }
    body
}
