use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Target encoding for a download. Every variant but [`ExportFormat::Svg`] is produced by the
/// raster encoder directly; SVG is a raster-in-vector wrapper around a PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "JPEG")]
    Jpeg,
    #[default]
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "WebP")]
    WebP,
    #[serde(rename = "SVG")]
    Svg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Jpeg,
        ExportFormat::Png,
        ExportFormat::WebP,
        ExportFormat::Svg,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Png => "PNG",
            ExportFormat::WebP => "WebP",
            ExportFormat::Svg => "SVG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Png => "png",
            ExportFormat::WebP => "webp",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
            ExportFormat::WebP => "image/webp",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    pub fn filename(&self) -> String {
        format!("image.{}", self.extension())
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, ExportFormat::Svg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            "webp" => Ok(ExportFormat::WebP),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Encoded bytes ready to hand to a download surface. Consumed by the download.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl ExportArtifact {
    pub fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: format.mime_type().to_string(),
            filename: format.filename(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("mime_type", &self.mime_type)
            .field("filename", &self.filename)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_png() {
        assert_eq!(ExportFormat::default(), ExportFormat::Png);
    }

    #[test]
    fn test_mime_types_follow_extension() {
        for format in [ExportFormat::Jpeg, ExportFormat::Png, ExportFormat::WebP] {
            assert_eq!(format.mime_type(), format!("image/{}", format.extension()));
        }
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("WebP".parse::<ExportFormat>(), Ok(ExportFormat::WebP));
        assert_eq!("jpg".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert_eq!(" svg ".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_artifact_metadata() {
        let artifact = ExportArtifact::new(ExportFormat::WebP, vec![1, 2, 3]);
        assert_eq!(artifact.filename, "image.webp");
        assert_eq!(artifact.mime_type, "image/webp");
        assert_eq!(artifact.len(), 3);
        assert!(format!("{:?}", artifact).contains("<3 bytes>"));
    }
}
