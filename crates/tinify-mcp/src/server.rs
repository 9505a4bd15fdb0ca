//! MCP server using rmcp SDK
//!
//! Exposes the optimization pipeline as a single MCP tool over stdio.

use crate::tools::*;
use futures::FutureExt;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::borrow::Cow;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tinify_api_client::{OptimizeRequest, Optimizer};
use tinify_core::models::OptimizationResult;
use tinify_core::{ErrorMetadata, LogLevel, TinifyError};

/// Message shown when the pipeline panics.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

fn text_content(s: impl Into<String>) -> Content {
    Content {
        raw: RawContent::Text(RawTextContent { text: s.into() }),
        annotations: None,
    }
}

fn log_failure(err: &TinifyError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error_code = code, error = %err, "Optimization failed"),
        LogLevel::Warn => tracing::warn!(error_code = code, error = %err, "Optimization failed"),
        LogLevel::Error => tracing::error!(
            error_code = code,
            remote_status = ?err.remote_status(),
            error = %err,
            "Optimization failed"
        ),
    }
}

#[derive(Debug, Clone)]
pub struct TinifyService {
    optimizer: Arc<Optimizer>,
    tool_router: ToolRouter<TinifyService>,
}

#[tool_router]
impl TinifyService {
    pub fn new(optimizer: Optimizer) -> Self {
        Self {
            optimizer: Arc::new(optimizer),
            tool_router: Self::tool_router(),
        }
    }

    /// Run the pipeline, turning every failure (panics included) into a caller message.
    async fn run(&self, request: OptimizeRequest) -> Result<OptimizationResult, String> {
        let outcome = AssertUnwindSafe(self.optimizer.optimize(&request))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                log_failure(&err);
                Err(err.to_string())
            }
            Err(_) => {
                tracing::error!(input = %request.input, "Optimization panicked");
                Err(UNEXPECTED_ERROR_MESSAGE.to_string())
            }
        }
    }

    #[tool(
        description = "Optimize an image (local path or URL) with the Tinify service: compress, \
                       convert, resize or upscale, and generate SEO tags. Saves the result locally \
                       and returns where it was written."
    )]
    async fn optimize_image(
        &self,
        Parameters(req): Parameters<OptimizeImageRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.run(req.into()).await {
            Ok(result) => result,
            Err(message) => return Ok(CallToolResult::error(vec![text_content(message)])),
        };
        let text = serde_json::to_string_pretty(&result).map_err(|e| ErrorData {
            code: ErrorCode(-32603),
            message: Cow::from(e.to_string()),
            data: None,
        })?;
        Ok(CallToolResult::success(vec![
            text_content(result.summary()),
            text_content(text),
        ]))
    }
}

#[tool_handler]
impl ServerHandler for TinifyService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tinify-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Tinify MCP: optimize_image compresses, converts, resizes and tags an image, \
                 then saves it next to the input or at output_path. Set TINIFY_API_URL to use \
                 another endpoint."
                    .to_string(),
            ),
        }
    }
}
