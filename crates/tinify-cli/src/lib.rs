//! Shared pieces of the `tinify` command-line client.

use clap::Args;
use tinify_api_client::OptimizeRequest;
use tinify_core::models::{OutputFormat, ResizeMode};

/// Flags of `tinify optimize`, mirroring the MCP tool parameters.
#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// Local file path or http(s) URL of the image
    pub input: String,

    /// Output file, or a folder when it ends with '/'
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format: original, jpeg, png, or webp
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Target width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Target height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// AI upscale factor (0.1 to 10)
    #[arg(long)]
    pub upscale: Option<f64>,

    /// Resize mode: pad or crop
    #[arg(long)]
    pub resize_mode: Option<ResizeMode>,

    /// Keep the aspect ratio when resizing
    #[arg(long)]
    pub aspect_lock: Option<bool>,

    /// Skip SEO alt text and keyword generation
    #[arg(long)]
    pub no_seo: bool,

    /// Completion wait in milliseconds (overrides TINIFY_COMPLETION_TIMEOUT_MS)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl OptimizeArgs {
    pub fn to_request(&self) -> OptimizeRequest {
        OptimizeRequest {
            input: self.input.clone(),
            output_path: self.output.clone(),
            output_format: self.format,
            output_width_px: self.width,
            output_height_px: self.height,
            output_upscale_factor: self.upscale,
            output_resize_mode: self.resize_mode,
            output_aspect_lock: self.aspect_lock,
            output_seo_tag_gen: self.no_seo.then_some(false),
        }
    }
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
