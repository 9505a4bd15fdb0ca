//! MCP tool request types with JSON Schema for AI parameter generation

use schemars::JsonSchema;
use serde::Deserialize;
use tinify_api_client::OptimizeRequest;
use tinify_core::models::{OutputFormat, ResizeMode};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OptimizeImageRequest {
    #[schemars(description = "Local file path or http(s) URL of the image to optimize")]
    pub input: String,
    #[schemars(
        description = "Where to save the result. A path ending in '/' is treated as a folder. \
                       Defaults to a '.tinified' sibling of the input"
    )]
    pub output_path: Option<String>,
    #[schemars(description = "Output format; 'original' keeps the input format")]
    pub output_format: Option<OutputFormatParam>,
    #[schemars(description = "Target width in pixels")]
    pub output_width_px: Option<u32>,
    #[schemars(description = "Target height in pixels")]
    pub output_height_px: Option<u32>,
    #[schemars(description = "AI upscale factor between 0.1 and 10")]
    pub output_upscale_factor: Option<f64>,
    #[schemars(description = "How to fit the target dimensions")]
    pub output_resize_mode: Option<ResizeModeParam>,
    #[schemars(description = "Keep the aspect ratio when resizing")]
    pub output_aspect_lock: Option<bool>,
    #[schemars(description = "Generate SEO alt text and keywords (default true)")]
    pub output_seo_tag_gen: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatParam {
    Original,
    Jpeg,
    Png,
    Webp,
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResizeModeParam {
    Pad,
    Crop,
}

impl From<OutputFormatParam> for OutputFormat {
    fn from(param: OutputFormatParam) -> Self {
        match param {
            OutputFormatParam::Original => OutputFormat::Original,
            OutputFormatParam::Jpeg => OutputFormat::Jpeg,
            OutputFormatParam::Png => OutputFormat::Png,
            OutputFormatParam::Webp => OutputFormat::Webp,
        }
    }
}

impl From<ResizeModeParam> for ResizeMode {
    fn from(param: ResizeModeParam) -> Self {
        match param {
            ResizeModeParam::Pad => ResizeMode::Pad,
            ResizeModeParam::Crop => ResizeMode::Crop,
        }
    }
}

impl From<OptimizeImageRequest> for OptimizeRequest {
    fn from(req: OptimizeImageRequest) -> Self {
        OptimizeRequest {
            input: req.input,
            output_path: req.output_path,
            output_format: req.output_format.map(Into::into),
            output_width_px: req.output_width_px,
            output_height_px: req.output_height_px,
            output_upscale_factor: req.output_upscale_factor,
            output_resize_mode: req.output_resize_mode.map(Into::into),
            output_aspect_lock: req.output_aspect_lock,
            output_seo_tag_gen: req.output_seo_tag_gen,
        }
    }
}
