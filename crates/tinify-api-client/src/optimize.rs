//! End-to-end optimization pipeline.
//!
//! resolve input -> stage -> persist refreshed credential -> submit -> wait for
//! completion -> retrieve -> resolve destination -> write. Each step runs only
//! after the previous one produced its result; any failure ends the pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tinify_core::destination::{resolve_destination, DestinationRequest};
use tinify_core::models::{
    InputPayload, OptimizationResult, OutputFormat, ProcessingSettings, ResizeMode,
};
use tinify_core::{
    subscribe_and_wait, CredentialStore, FileCredentialStore, TinifyConfig, TinifyError,
    TinifyResult, DEFAULT_COMPLETION_TIMEOUT,
};

use crate::input::InputResolver;
use crate::ApiClient;

const MIN_UPSCALE_FACTOR: f64 = 0.1;
const MAX_UPSCALE_FACTOR: f64 = 10.0;

/// Caller parameters for one optimization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// Local file path or remote URL
    pub input: String,
    pub output_path: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub output_width_px: Option<u32>,
    pub output_height_px: Option<u32>,
    pub output_upscale_factor: Option<f64>,
    pub output_resize_mode: Option<ResizeMode>,
    pub output_aspect_lock: Option<bool>,
    pub output_seo_tag_gen: Option<bool>,
}

impl OptimizeRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> TinifyResult<()> {
        if self.input.trim().is_empty() {
            return Err(TinifyError::InvalidInput(
                "input must be a file path or URL".to_string(),
            ));
        }
        if self.output_width_px == Some(0) {
            return Err(TinifyError::InvalidInput(
                "output_width_px must be a positive integer".to_string(),
            ));
        }
        if self.output_height_px == Some(0) {
            return Err(TinifyError::InvalidInput(
                "output_height_px must be a positive integer".to_string(),
            ));
        }
        if let Some(factor) = self.output_upscale_factor {
            if !(MIN_UPSCALE_FACTOR..=MAX_UPSCALE_FACTOR).contains(&factor) {
                return Err(TinifyError::InvalidInput(format!(
                    "output_upscale_factor must be between {} and {}",
                    MIN_UPSCALE_FACTOR, MAX_UPSCALE_FACTOR
                )));
            }
        }
        Ok(())
    }

    /// Processing settings with defaults applied: keep the original format,
    /// generate SEO tags, never rename.
    pub fn settings(&self) -> ProcessingSettings {
        ProcessingSettings {
            format: Some(self.output_format.unwrap_or_default()),
            upscale_factor: self.output_upscale_factor,
            width: self.output_width_px,
            height: self.output_height_px,
            aspect_lock: self.output_aspect_lock,
            resize_mode: self.output_resize_mode,
            seo_tag_gen: Some(self.output_seo_tag_gen.unwrap_or(true)),
            seo_rename: Some(false),
        }
    }
}

/// Drives one optimization at a time against the service.
#[derive(Debug, Clone)]
pub struct Optimizer {
    api: ApiClient,
    credentials: Arc<dyn CredentialStore>,
    completion_timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl Optimizer {
    pub fn new(api: ApiClient, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            credentials,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            working_dir: None,
        }
    }

    /// Client, file-backed credential store, and completion budget from config.
    pub fn from_config(config: &TinifyConfig) -> TinifyResult<Self> {
        let api = ApiClient::from_config(config)?;
        let store = FileCredentialStore::new(config.session_dir.clone());
        Ok(Self::new(api, Arc::new(store)).with_completion_timeout(config.completion_timeout))
    }

    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// Directory that relative paths and remote-input outputs resolve against.
    /// Defaults to the process working directory at call time.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn optimize(&self, request: &OptimizeRequest) -> TinifyResult<OptimizationResult> {
        request.validate()?;

        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let mut credential = self.credentials.load();

        let InputPayload {
            bytes,
            name,
            is_remote,
        } = InputResolver::new(self.api.client().clone(), &working_dir)
            .resolve(&request.input)
            .await?;

        let handle = self.api.stage(bytes, &name, credential.as_deref()).await?;
        if let Some(fresh) = handle.new_credential.as_deref().filter(|t| !t.is_empty()) {
            self.credentials.save(fresh)?;
            credential = Some(fresh.to_string());
        }

        let settings = request.settings();
        let submission = self
            .api
            .submit(
                std::slice::from_ref(&handle.temp_id),
                &settings,
                credential.as_deref(),
            )
            .await?;
        let job_id = submission
            .primary_job()
            .map(|job| job.id.clone())
            .ok_or_else(|| TinifyError::Unrecoverable("No job created by the server.".to_string()))?;
        if submission.jobs.len() > 1 {
            tracing::debug!(
                job_id = %job_id,
                jobs = submission.jobs.len(),
                "Multiple jobs submitted; waiting on the first only"
            );
        }

        let completed = subscribe_and_wait(
            &job_id,
            self.api.subscribe(&job_id, credential.as_deref(), self.completion_timeout),
            self.completion_timeout,
        )
        .await?;

        let artifact = self.api.retrieve(&job_id, credential.as_deref()).await?;

        let format_override = request
            .output_format
            .and_then(|f| f.explicit())
            .or(completed.processed_format.as_deref());
        let output_path = resolve_destination(&DestinationRequest {
            input: &request.input,
            is_remote,
            suggested_name: &name,
            explicit_destination: request.output_path.as_deref(),
            format_override,
            working_dir: &working_dir,
        });

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&output_path, &artifact.bytes).await?;

        tracing::info!(
            job_id = %job_id,
            output_path = %output_path.display(),
            size = artifact.bytes.len(),
            "Image optimized"
        );

        Ok(OptimizationResult {
            output_path,
            output_size_bytes: completed
                .processed_size
                .unwrap_or(artifact.bytes.len() as u64),
            output_width_px: completed.processed_width,
            output_height_px: completed.processed_height,
            output_format: completed.processed_format,
            compression_ratio: completed.processed_compression_ratio,
            seo_alt_text: completed.seo_alt_text,
            seo_keywords: completed.seo_keywords,
            seo_filename: completed.seo_filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = OptimizeRequest::new("hero.png").settings();
        assert_eq!(settings.format, Some(OutputFormat::Original));
        assert_eq!(settings.seo_tag_gen, Some(true));
        assert_eq!(settings.seo_rename, Some(false));
        assert_eq!(settings.width, None);
        assert_eq!(settings.resize_mode, None);
    }

    #[test]
    fn test_settings_carry_caller_values() {
        let request = OptimizeRequest {
            output_format: Some(OutputFormat::Webp),
            output_width_px: Some(1200),
            output_resize_mode: Some(ResizeMode::Crop),
            output_aspect_lock: Some(false),
            output_seo_tag_gen: Some(false),
            ..OptimizeRequest::new("hero.png")
        };
        let settings = request.settings();
        assert_eq!(settings.format, Some(OutputFormat::Webp));
        assert_eq!(settings.width, Some(1200));
        assert_eq!(settings.resize_mode, Some(ResizeMode::Crop));
        assert_eq!(settings.aspect_lock, Some(false));
        assert_eq!(settings.seo_tag_gen, Some(false));
    }

    #[test]
    fn test_validation() {
        assert!(OptimizeRequest::new("hero.png").validate().is_ok());
        assert!(OptimizeRequest::new("  ").validate().is_err());

        let zero_width = OptimizeRequest {
            output_width_px: Some(0),
            ..OptimizeRequest::new("hero.png")
        };
        assert!(matches!(zero_width.validate(), Err(TinifyError::InvalidInput(_))));

        let huge_upscale = OptimizeRequest {
            output_upscale_factor: Some(12.0),
            ..OptimizeRequest::new("hero.png")
        };
        assert!(huge_upscale.validate().is_err());

        let upscale = OptimizeRequest {
            output_upscale_factor: Some(4.0),
            ..OptimizeRequest::new("hero.png")
        };
        assert!(upscale.validate().is_ok());
    }
}
