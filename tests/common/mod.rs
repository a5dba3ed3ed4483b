//! Test helpers for the HTTP integration tests.
//!
//! Provides a tempdir-backed application state and an axum-test server.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

use linkdrop::blob::BlobStore;
use linkdrop::config::WebConfig;
use linkdrop::record::RecordStore;
use linkdrop::web::handlers::AppState;
use linkdrop::web::link::LinkBuilder;
use linkdrop::web::router::create_router;

/// Upload ceiling used by the test servers.
pub const TEST_MAX_UPLOAD: u64 = 64 * 1024;

/// Fallback host used for share links when a request carries no Host header.
pub const TEST_HOST: &str = "localhost:3000";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    _dir: TempDir,
}

/// Build application state rooted in a fresh temp directory.
pub fn test_state(dir: &TempDir, max_upload: u64) -> Arc<AppState> {
    let records = RecordStore::new(dir.path().join("data")).expect("record store");
    let blobs = BlobStore::new(dir.path().join("uploads"), max_upload).expect("blob store");
    let links = LinkBuilder::new(None, TEST_HOST);
    Arc::new(AppState::new(records, blobs, links).expect("app state"))
}

/// Start a test server with the default upload ceiling.
pub fn test_app() -> TestApp {
    test_app_with_limit(TEST_MAX_UPLOAD)
}

/// Start a test server with a custom upload ceiling.
pub fn test_app_with_limit(max_upload: u64) -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let state = test_state(&dir, max_upload);
    let web_config = WebConfig {
        serve_static: false,
        ..WebConfig::default()
    };

    let router = create_router(state.clone(), &web_config);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _dir: dir,
    }
}

/// Multipart form with a single `file` part.
pub fn file_form(name: &str, content: &[u8]) -> MultipartForm {
    let part = Part::bytes(content.to_vec())
        .file_name(name.to_string())
        .mime_type("application/octet-stream");
    MultipartForm::new().add_part("file", part)
}

/// Upload a file and return the share id from the returned link.
pub async fn upload(server: &TestServer, name: &str, content: &[u8]) -> String {
    let response = server.post("/upload").multipart(file_form(name, content)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let link = body["link"].as_str().expect("link").to_string();
    link.rsplit('/').next().expect("id").to_string()
}
