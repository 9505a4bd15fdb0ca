//! Data models for the optimization pipeline
//!
//! Wire shapes exchanged with the remote service and the records handed back to
//! callers, organized by pipeline stage.

mod input;
mod job;
mod result;
mod settings;

pub use input::*;
pub use job::*;
pub use result::*;
pub use settings::*;
