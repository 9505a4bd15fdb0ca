//! Input resolution: turn a local path or remote URL into bytes plus a name.

use std::path::{Path, PathBuf};

use reqwest::{Client, Url};
use tinify_core::models::{is_remote_locator, InputPayload};
use tinify_core::{TinifyError, TinifyResult};

/// Name used for remote inputs whose URL has no file-like last segment.
pub const FALLBACK_REMOTE_NAME: &str = "image";

#[derive(Clone, Debug)]
pub struct InputResolver {
    client: Client,
    working_dir: PathBuf,
}

impl InputResolver {
    /// `working_dir` anchors relative local paths.
    pub fn new(client: Client, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            working_dir: working_dir.into(),
        }
    }

    pub async fn resolve(&self, locator: &str) -> TinifyResult<InputPayload> {
        if is_remote_locator(locator) {
            self.fetch_remote(locator).await
        } else {
            self.read_local(locator).await
        }
    }

    async fn fetch_remote(&self, url: &str) -> TinifyResult<InputPayload> {
        let fetch_failed = |reason: String| TinifyError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        tracing::debug!(url = %url, size = bytes.len(), "Fetched remote input");
        Ok(InputPayload {
            bytes: bytes.to_vec(),
            name: filename_from_url(url),
            is_remote: true,
        })
    }

    async fn read_local(&self, locator: &str) -> TinifyResult<InputPayload> {
        let path = self.working_dir.join(locator);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TinifyError::InputNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_REMOTE_NAME)
            .to_string();

        tracing::debug!(path = %path.display(), size = bytes.len(), "Read local input");
        Ok(InputPayload {
            bytes,
            name,
            is_remote: false,
        })
    }
}

/// Last path segment of the URL when it looks like a file name, else `image`.
pub fn filename_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| Path::new(name).extension().is_some())
        .unwrap_or_else(|| FALLBACK_REMOTE_NAME.to_string())
}
