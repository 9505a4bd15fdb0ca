use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Final outcome of one optimization, returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub output_width_px: Option<u32>,
    pub output_height_px: Option<u32>,
    pub output_format: Option<String>,
    pub compression_ratio: Option<f64>,
    pub seo_alt_text: Option<String>,
    pub seo_keywords: Option<Vec<String>>,
    pub seo_filename: Option<String>,
}

impl OptimizationResult {
    /// Human-readable summary, one fact per line. Absent facts are skipped.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Optimized: {}", self.output_path.display()),
            format!("Size: {:.1} KB", self.output_size_bytes as f64 / 1024.0),
        ];
        if let Some(ratio) = self.compression_ratio {
            lines.push(format!("Compression: {:.0}%", ratio * 100.0));
        }
        if let Some(format) = self.output_format.as_deref().filter(|f| !f.is_empty()) {
            lines.push(format!("Format: {}", format));
        }
        if let (Some(w), Some(h)) = (self.output_width_px, self.output_height_px) {
            if w > 0 && h > 0 {
                lines.push(format!("Dimensions: {}x{}", w, h));
            }
        }
        if let Some(alt) = self.seo_alt_text.as_deref().filter(|a| !a.is_empty()) {
            lines.push(format!("Alt text: {}", alt));
        }
        lines.join("\n")
    }
}
