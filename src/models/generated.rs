use crate::error::ExportError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// The currently displayed image, held as a resource locator: a remote URL or an
/// embedded `data:` URL. Replaced wholesale on each generation, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    locator: String,
}

/// Borrowed view of where a [`GeneratedImage`] lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLocator<'a> {
    Remote(&'a str),
    Embedded {
        mime_type: &'a str,
        base64: bool,
        payload: &'a str,
    },
}

impl GeneratedImage {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }

    /// Builds an embedded image from raw encoded bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::new(data_url(mime_type, bytes))
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn is_embedded(&self) -> bool {
        self.locator.starts_with("data:")
    }

    pub fn parse(&self) -> Result<ImageLocator<'_>, ExportError> {
        if let Some(rest) = self.locator.strip_prefix("data:") {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                ExportError::Decode("data URL is missing its ',' separator".into())
            })?;
            let (mime_type, base64) = match header.strip_suffix(";base64") {
                Some(mime) => (mime, true),
                None => (header, false),
            };
            return Ok(ImageLocator::Embedded {
                mime_type,
                base64,
                payload,
            });
        }

        if self.locator.starts_with("http://") || self.locator.starts_with("https://") {
            return Ok(ImageLocator::Remote(&self.locator));
        }

        Err(ExportError::Decode(format!(
            "unsupported image reference: {}",
            preview(&self.locator)
        )))
    }
}

pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// First few characters of a locator, for logs and error messages. Data URLs can be megabytes.
pub fn preview(locator: &str) -> String {
    const MAX: usize = 48;
    match locator.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &locator[..idx]),
        None => locator.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateImagePayload<'a> {
    pub prompt: &'a str,
}

/// Body returned by the generation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateImageResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "resultImage", alias = "imageRef")]
    pub result_image: Option<String>,
    #[serde(default, rename = "creditBalance")]
    pub credit_balance: Option<u64>,
}
