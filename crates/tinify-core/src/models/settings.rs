use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel format value meaning "keep the input's format".
pub const ORIGINAL_FORMAT: &str = "original";

/// Requested output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Original,
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Original => ORIGINAL_FORMAT,
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    /// The format name to use as a file extension, or `None` for [`OutputFormat::Original`].
    pub fn explicit(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Original => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(OutputFormat::Original),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            _ => Err(format!(
                "Invalid output format '{}'. Must be: original, jpeg, png, or webp",
                s
            )),
        }
    }
}

/// How the service fills the frame when the aspect ratio changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// White padding around the image
    Pad,
    /// Smart cropping
    Crop,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pad" => Ok(ResizeMode::Pad),
            "crop" => Ok(ResizeMode::Crop),
            _ => Err(format!("Invalid resize mode '{}'. Must be: pad or crop", s)),
        }
    }
}

/// Transform requested from the service. Serialized as the `settings` object of a
/// processing request; unset options are omitted from the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    #[serde(rename = "output_format", skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(rename = "output_upscale_factor", skip_serializing_if = "Option::is_none")]
    pub upscale_factor: Option<f64>,
    #[serde(rename = "output_width", skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(rename = "output_height", skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(rename = "output_aspect_lock", skip_serializing_if = "Option::is_none")]
    pub aspect_lock: Option<bool>,
    #[serde(rename = "output_resize_mode", skip_serializing_if = "Option::is_none")]
    pub resize_mode: Option<ResizeMode>,
    #[serde(rename = "output_seo_tag_gen", skip_serializing_if = "Option::is_none")]
    pub seo_tag_gen: Option<bool>,
    #[serde(rename = "output_seo_rename", skip_serializing_if = "Option::is_none")]
    pub seo_rename: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_settings_are_omitted() {
        let settings = ProcessingSettings {
            format: Some(OutputFormat::Original),
            seo_tag_gen: Some(true),
            seo_rename: Some(false),
            ..Default::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "output_format": "original",
                "output_seo_tag_gen": true,
                "output_seo_rename": false
            })
        );
    }

    #[test]
    fn test_resize_settings_wire_names() {
        let settings = ProcessingSettings {
            format: Some(OutputFormat::Webp),
            width: Some(800),
            height: Some(600),
            aspect_lock: Some(true),
            resize_mode: Some(ResizeMode::Crop),
            upscale_factor: Some(2.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["output_format"], "webp");
        assert_eq!(value["output_width"], 800);
        assert_eq!(value["output_height"], 600);
        assert_eq!(value["output_aspect_lock"], true);
        assert_eq!(value["output_resize_mode"], "crop");
        assert_eq!(value["output_upscale_factor"], 2.0);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("WEBP".parse::<OutputFormat>(), Ok(OutputFormat::Webp));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Original.explicit(), None);
        assert_eq!(OutputFormat::Png.explicit(), Some("png"));
    }
}
