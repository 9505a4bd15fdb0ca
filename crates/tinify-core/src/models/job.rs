use serde::{Deserialize, Serialize};

/// Server-side reference to staged bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadHandle {
    #[serde(rename = "temp_file_id")]
    pub temp_id: String,
    pub original_filename: String,
    #[serde(rename = "file_size")]
    pub byte_size: u64,
    pub mime_type: String,
    /// Refreshed credential; supersedes whatever was sent with the request
    #[serde(rename = "session_token", default)]
    pub new_credential: Option<String>,
}

/// One submitted unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "temp_file_id", default)]
    pub source_temp_id: String,
    #[serde(default)]
    pub status: String,
}

/// Outcome of a processing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub jobs: Vec<JobHandle>,
    #[serde(default)]
    pub credits_used: u32,
    #[serde(default)]
    pub credits_remaining: u32,
}

impl SubmissionResult {
    /// The job the pipeline drives forward: the first one, if it has a usable id.
    pub fn primary_job(&self) -> Option<&JobHandle> {
        self.jobs.first().filter(|job| !job.id.is_empty())
    }
}

/// Terminal status reported on the completion channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
    Expired,
}

/// Terminal notification for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub processed_filename: Option<String>,
    #[serde(default)]
    pub processed_size: Option<u64>,
    #[serde(default)]
    pub processed_format: Option<String>,
    #[serde(default)]
    pub processed_width: Option<u32>,
    #[serde(default)]
    pub processed_height: Option<u32>,
    #[serde(default)]
    pub processed_compression_ratio: Option<f64>,
    #[serde(default)]
    pub seo_alt_text: Option<String>,
    #[serde(default)]
    pub seo_filename: Option<String>,
    #[serde(default)]
    pub seo_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CompletionEvent {
    /// A bare event with only the id and status set.
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            processed_filename: None,
            processed_size: None,
            processed_format: None,
            processed_width: None,
            processed_height: None,
            processed_compression_ratio: None,
            seo_alt_text: None,
            seo_filename: None,
            seo_keywords: None,
            error: None,
        }
    }
}

/// Downloaded artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBytes {
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
}
