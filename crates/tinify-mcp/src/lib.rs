//! Tinify MCP Server
//!
//! Model Context Protocol server that exposes image optimization as a tool for
//! AI assistants (Claude Desktop, Cursor, etc.)

pub mod server;
pub mod tools;

pub use server::TinifyService;
pub use tinify_api_client::Optimizer;
