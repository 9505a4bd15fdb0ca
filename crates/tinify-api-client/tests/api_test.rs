//! Service call tests against a mock server.
//!
//! Run with: `cargo test -p tinify-api-client --test api_test`

mod helpers;

use std::time::Duration;

use helpers::{api_client, completed_payload, mount_stream, sse, PNG_BYTES};
use serde_json::json;
use tinify_api_client::SESSION_HEADER;
use tinify_core::models::{OutputFormat, ProcessingSettings};
use tinify_core::{ChannelEvent, NotificationChannel, TinifyError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_stage_returns_handle_and_new_credential() {
    let server = MockServer::start().await;
    helpers::mount_stage(&server, "t1", Some("fresh-token")).await;

    let handle = api_client(&server)
        .stage(PNG_BYTES.to_vec(), "hero.png", None)
        .await
        .unwrap();
    assert_eq!(handle.temp_id, "t1");
    assert_eq!(handle.byte_size, PNG_BYTES.len() as u64);
    assert_eq!(handle.new_credential.as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_stage_error_mapping() {
    let cases = [
        (413, json!({ "detail": "Too big" })),
        (415, json!({})),
        (400, json!({ "detail": "Unsupported file type: image/bmp" })),
        (500, json!({ "detail": "Storage unavailable" })),
        (502, json!({})),
    ];

    let mut errors = Vec::new();
    for (status, body) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        errors.push(
            api_client(&server)
                .stage(PNG_BYTES.to_vec(), "hero.png", None)
                .await
                .unwrap_err(),
        );
    }

    assert!(matches!(errors[0], TinifyError::ArtifactTooLarge { .. }));
    assert!(matches!(errors[1], TinifyError::UnsupportedFormat { status: 415, .. }));
    assert!(matches!(errors[2], TinifyError::UnsupportedFormat { status: 400, .. }));
    assert_eq!(errors[3].to_string(), "Storage unavailable");
    assert_eq!(errors[4].to_string(), "Upload failed");
}

#[tokio::test]
async fn test_stage_rejects_empty_temp_id() {
    let server = MockServer::start().await;
    helpers::mount_stage(&server, "", None).await;

    let err = api_client(&server)
        .stage(PNG_BYTES.to_vec(), "hero.png", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TinifyError::Unrecoverable(_)));
}

#[tokio::test]
async fn test_submit_sends_settings_and_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auto"))
        .and(header(SESSION_HEADER, "tok"))
        .and(body_partial_json(json!({
            "temp_file_ids": ["t1"],
            "settings": { "output_format": "webp", "output_width": 640 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "jobs": [{ "id": "j1", "temp_file_id": "t1", "status": "queued" }],
            "credits_used": 1,
            "credits_remaining": 19
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ProcessingSettings {
        format: Some(OutputFormat::Webp),
        width: Some(640),
        ..Default::default()
    };
    let result = api_client(&server)
        .submit(&["t1".to_string()], &settings, Some("tok"))
        .await
        .unwrap();
    assert_eq!(result.primary_job().map(|j| j.id.as_str()), Some("j1"));
    assert_eq!(result.credits_remaining, 19);
}

#[tokio::test]
async fn test_submit_insufficient_credits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auto"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("X-RateLimit-Remaining", "0")
                .set_body_json(json!({
                    "detail": "Daily limit reached.",
                    "credits_required": 1
                })),
        )
        .mount(&server)
        .await;

    let err = api_client(&server)
        .submit(&["t1".to_string()], &ProcessingSettings::default(), None)
        .await
        .unwrap_err();
    match &err {
        TinifyError::InsufficientCredits {
            remaining,
            required,
            ..
        } => {
            assert_eq!(*remaining, 0);
            assert_eq!(*required, Some(1));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Insufficient credits. 0 of 20 daily credits left. Daily limit reached."
    );
}

#[tokio::test]
async fn test_submit_generic_failure_uses_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auto"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "Queue full" })))
        .mount(&server)
        .await;

    let err = api_client(&server)
        .submit(&["t1".to_string()], &ProcessingSettings::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, TinifyError::RemoteRequestFailed { status: 500, .. }));
    assert_eq!(err.to_string(), "Queue full");
}

#[tokio::test]
async fn test_retrieve_error_mapping() {
    let server = MockServer::start().await;
    for (job, status) in [("gone", 410), ("busy", 400), ("nope", 404)] {
        Mock::given(method("GET"))
            .and(path(format!("/download/{}", job)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }
    let client = api_client(&server);

    assert!(matches!(
        client.retrieve("gone", None).await.unwrap_err(),
        TinifyError::JobExpired
    ));
    assert!(matches!(
        client.retrieve("busy", None).await.unwrap_err(),
        TinifyError::JobNotReady
    ));
    assert!(matches!(
        client.retrieve("nope", None).await.unwrap_err(),
        TinifyError::JobNotFound
    ));
}

#[tokio::test]
async fn test_retrieve_reads_filename() {
    let server = MockServer::start().await;
    helpers::mount_download(&server, "j1", b"optimized-png", "hero.tinified.png").await;

    let artifact = api_client(&server).retrieve("j1", None).await.unwrap();
    assert_eq!(artifact.bytes, b"optimized-png");
    assert_eq!(artifact.suggested_filename, "hero.tinified.png");
}

#[tokio::test]
async fn test_retrieve_without_disposition_uses_fallback_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;

    let artifact = api_client(&server).retrieve("j1", None).await.unwrap();
    assert_eq!(artifact.suggested_filename, "output");
}

#[tokio::test]
async fn test_subscribe_delivers_completion() {
    let server = MockServer::start().await;
    let body = format!(
        ": connected\n\n{}{}",
        sse("progress", "{\"pct\":40}"),
        sse("complete", &completed_payload("j1").to_string())
    );
    mount_stream(&server, "j1", body).await;

    let mut stream = api_client(&server)
        .subscribe("j1", None, Duration::from_secs(5))
        .await
        .unwrap();
    match stream.next_event().await {
        Some(ChannelEvent::Complete(event)) => {
            assert_eq!(event.job_id, "j1");
            assert_eq!(event.processed_width, Some(800));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(stream.next_event().await, None);
}

#[tokio::test]
async fn test_subscribe_unknown_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/missing/stream"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = api_client(&server)
        .subscribe("missing", None, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, TinifyError::JobNotFound));
}
