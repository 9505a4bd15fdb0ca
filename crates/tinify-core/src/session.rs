//! Credential persistence
//!
//! The service hands out an opaque session token on staging. It is cached on disk
//! so later invocations reuse the same allowance.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::TinifyResult;

const SESSION_FILE_NAME: &str = "session.json";

/// Two-operation key-value store for the reusable credential.
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Read the stored credential. Missing or unreadable records yield `None`.
    fn load(&self) -> Option<String>;

    /// Replace the stored credential.
    fn save(&self, credential: &str) -> TinifyResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    session_token: String,
}

/// Stores the credential as `{"session_token": ...}` in `<dir>/session.json`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
    file: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let file = dir.join(SESSION_FILE_NAME);
        Self { dir, file }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self) -> &Path {
        &self.file
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.file).ok()?;
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if !record.session_token.is_empty() => Some(record.session_token),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path = %self.file.display(), error = %e, "Ignoring malformed session record");
                None
            }
        }
    }

    fn save(&self, credential: &str) -> TinifyResult<()> {
        fs::create_dir_all(&self.dir)?;

        let record = SessionRecord {
            session_token: credential.to_string(),
        };
        let body = serde_json::to_string_pretty(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // Unique sibling per writer, then rename over the record.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.persist(&self.file).map_err(|e| e.error)?;

        tracing::debug!(path = %self.file.display(), "Session token saved");
        Ok(())
    }
}
