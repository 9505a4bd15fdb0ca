//! Shared fixtures for the service mock.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tinify_api_client::{ApiClient, Optimizer};
use tinify_core::FileCredentialStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

pub fn api_client(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), Duration::from_secs(10)).expect("client builds")
}

/// Optimizer rooted in a fresh working dir with its own session dir.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub session_dir: TempDir,
    pub optimizer: Optimizer,
}

impl TestEnv {
    pub fn new(server: &MockServer) -> Self {
        let work_dir = tempfile::tempdir().expect("work dir");
        let session_dir = tempfile::tempdir().expect("session dir");
        let store = FileCredentialStore::new(session_dir.path());
        let optimizer = Optimizer::new(api_client(server), Arc::new(store))
            .with_completion_timeout(Duration::from_secs(5))
            .with_working_dir(work_dir.path());
        Self {
            work_dir,
            session_dir,
            optimizer,
        }
    }

    pub fn write_input(&self, name: &str) {
        std::fs::write(self.work_dir.path().join(name), PNG_BYTES).expect("write input");
    }

    pub fn store(&self) -> FileCredentialStore {
        FileCredentialStore::new(self.session_dir.path())
    }
}

/// One server-sent event frame.
pub fn sse(event: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

pub fn completed_payload(job_id: &str) -> Value {
    json!({
        "job_id": job_id,
        "status": "completed",
        "processed_filename": "hero.png",
        "processed_size": 30000,
        "processed_format": "png",
        "processed_width": 800,
        "processed_height": 600,
        "processed_compression_ratio": 0.6,
        "seo_alt_text": "A red bicycle leaning on a wall",
        "seo_keywords": ["bicycle", "red"]
    })
}

pub async fn mount_stage(server: &MockServer, temp_id: &str, token: Option<&str>) {
    let mut body = json!({
        "temp_file_id": temp_id,
        "original_filename": "hero.png",
        "file_size": PNG_BYTES.len(),
        "mime_type": "image/png"
    });
    if let Some(token) = token {
        body["session_token"] = json!(token);
    }
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_submit(server: &MockServer, temp_id: &str, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [{ "id": job_id, "temp_file_id": temp_id, "status": "queued" }],
            "credits_used": 1,
            "credits_remaining": 19
        })))
        .mount(server)
        .await;
}

pub async fn mount_stream(server: &MockServer, job_id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/status/{}/stream", job_id)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

pub async fn mount_download(server: &MockServer, job_id: &str, bytes: &[u8], filename: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", job_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", filename).as_str(),
                )
                .set_body_bytes(bytes.to_vec()),
        )
        .mount(server)
        .await;
}
