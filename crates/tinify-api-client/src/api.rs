//! Domain methods for the Tinify service: stage, submit, subscribe, retrieve.
//!
//! Each call forwards the credential it is given and translates non-success
//! statuses into [`TinifyError`] kinds. Nothing here retries.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tinify_core::models::{
    ArtifactBytes, ProcessingSettings, SubmissionResult, UploadHandle,
};
use tinify_core::{TinifyError, TinifyResult};

use crate::events::EventStream;
use crate::{ApiClient, ErrorBody};

/// Filename used when the download carries no usable attachment name.
pub const FALLBACK_ARTIFACT_NAME: &str = "output";

/// Grace added on top of the completion budget before the stream request itself times out.
const STREAM_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="?([^";\s]+)"?"#).expect("filename pattern is valid")
});

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    temp_file_ids: &'a [String],
    settings: &'a ProcessingSettings,
}

impl ApiClient {
    /// Upload raw bytes; returns the staged handle and possibly a fresh credential.
    pub async fn stage(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        credential: Option<&str>,
    ) -> TinifyResult<UploadHandle> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));
        let request = self.client().post(self.build_url("/upload")).multipart(form);
        let response = self.apply_credential(request, credential).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = ErrorBody::read(response).await;
            return Err(stage_failure(status.as_u16(), body));
        }

        let handle: UploadHandle = response.json().await?;
        if handle.temp_id.is_empty() {
            return Err(TinifyError::Unrecoverable(
                "Server returned an empty temp file id.".to_string(),
            ));
        }

        tracing::debug!(
            temp_file_id = %handle.temp_id,
            size = handle.byte_size,
            mime_type = %handle.mime_type,
            "Input staged"
        );
        Ok(handle)
    }

    /// Request processing of staged files.
    pub async fn submit(
        &self,
        temp_file_ids: &[String],
        settings: &ProcessingSettings,
        credential: Option<&str>,
    ) -> TinifyResult<SubmissionResult> {
        let body = ProcessRequest {
            temp_file_ids,
            settings,
        };
        let request = self.client().post(self.build_url("/auto")).json(&body);
        let response = self.apply_credential(request, credential).send().await?;

        let status = response.status();
        if !status.is_success() {
            let remaining = response
                .headers()
                .get("X-RateLimit-Remaining")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0);
            let body = ErrorBody::read(response).await;
            if status.as_u16() == 429 {
                return Err(TinifyError::InsufficientCredits {
                    remaining,
                    required: body.credits_required,
                    detail: body.detail,
                });
            }
            return Err(body.into_remote_failure(status.as_u16(), "Processing failed"));
        }

        let result: SubmissionResult = response.json().await?;
        tracing::debug!(
            jobs = result.jobs.len(),
            credits_used = result.credits_used,
            credits_remaining = result.credits_remaining,
            "Processing submitted"
        );
        Ok(result)
    }

    /// Open the completion event stream for one job.
    ///
    /// `wait` is the caller's completion budget; the request is allowed to outlive
    /// it slightly so the listener's own timer always fires first.
    pub async fn subscribe(
        &self,
        job_id: &str,
        credential: Option<&str>,
        wait: Duration,
    ) -> TinifyResult<EventStream> {
        let request = self
            .client()
            .get(self.build_url(&format!("/status/{}/stream", job_id)))
            .header(ACCEPT, "text/event-stream")
            .timeout(wait + STREAM_TIMEOUT_GRACE);
        let response = self.apply_credential(request, credential).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = ErrorBody::read(response).await;
            return Err(match status.as_u16() {
                404 => TinifyError::JobNotFound,
                code => body.into_remote_failure(code, "Status stream failed"),
            });
        }

        tracing::debug!(job_id = %job_id, "Subscribed to completion stream");
        Ok(EventStream::from_response(job_id, response))
    }

    /// Download the finished artifact for a completed job.
    pub async fn retrieve(&self, job_id: &str, credential: Option<&str>) -> TinifyResult<ArtifactBytes> {
        let request = self
            .client()
            .get(self.build_url(&format!("/download/{}", job_id)));
        let response = self.apply_credential(request, credential).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = ErrorBody::read(response).await;
            return Err(match status.as_u16() {
                410 => TinifyError::JobExpired,
                400 => TinifyError::JobNotReady,
                404 => TinifyError::JobNotFound,
                code => body.into_remote_failure(code, "Download failed"),
            });
        }

        let suggested_filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| FALLBACK_ARTIFACT_NAME.to_string());

        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(job_id = %job_id, size = bytes.len(), filename = %suggested_filename, "Artifact retrieved");

        Ok(ArtifactBytes {
            bytes,
            suggested_filename,
        })
    }
}

fn stage_failure(status: u16, body: ErrorBody) -> TinifyError {
    let mentions_unsupported = body
        .detail
        .as_deref()
        .is_some_and(|d| d.contains("Unsupported"));

    match status {
        413 => TinifyError::ArtifactTooLarge {
            detail: body.detail,
        },
        415 => TinifyError::UnsupportedFormat {
            status,
            detail: body.detail,
        },
        _ if mentions_unsupported => TinifyError::UnsupportedFormat {
            status,
            detail: body.detail,
        },
        _ => body.into_remote_failure(status, "Upload failed"),
    }
}

/// Extract the file name from a `Content-Disposition` header value.
pub fn filename_from_disposition(disposition: &str) -> Option<String> {
    FILENAME_RE
        .captures(disposition)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
