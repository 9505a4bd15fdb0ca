//! Tinify Core Library
//!
//! Domain models, the error taxonomy, configuration, and the pure pieces of the
//! optimization pipeline (output destination resolution and the completion
//! listener) shared by the API client, the MCP server, and the CLI.

pub mod completion;
pub mod config;
pub mod destination;
pub mod error;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use completion::{
    subscribe_and_wait, wait_for_completion, ChannelEvent, CompletionListener, ListenerState,
    NotificationChannel, DEFAULT_COMPLETION_TIMEOUT,
};
pub use config::{TinifyConfig, DEFAULT_BASE_URL};
pub use destination::{resolve_destination, DestinationRequest};
pub use error::{ErrorMetadata, LogLevel, TinifyError, TinifyResult};
pub use session::{CredentialStore, FileCredentialStore};
