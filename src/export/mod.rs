pub mod download;
pub mod surface;
pub mod svg;

use crate::{
    error::ExportError,
    logger,
    models::{preview, ExportArtifact, ExportFormat, GeneratedImage, ImageLocator},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;

pub use download::{DownloadSurface, FileDownloader};
pub use surface::Surface;

/// Re-encodes an already generated image into an [`ExportFormat`] without asking the
/// backend. Holds no state between calls, so concurrent conversions are independent.
#[derive(Clone, Default)]
pub struct FormatConverter {
    client: Client,
}

impl FormatConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn convert(
        &self,
        image: &GeneratedImage,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let _timer = logger::timer(&format!("convert to {}", format));

        let source = self.fetch(image).await?;
        log::debug!("Fetched {} source bytes for {}", source.len(), preview(image.locator()));

        let artifact = tokio::task::spawn_blocking(move || render(&source, format))
            .await
            .map_err(|e| ExportError::Encode(format!("encoder task failed: {}", e)))??;

        log::info!(
            "Converted image to {} ({} bytes)",
            artifact.mime_type,
            artifact.len()
        );
        Ok(artifact)
    }

    /// Resolves the locator to encoded image bytes.
    async fn fetch(&self, image: &GeneratedImage) -> Result<Vec<u8>, ExportError> {
        match image.parse()? {
            ImageLocator::Embedded {
                base64: true,
                payload,
                ..
            } => STANDARD
                .decode(payload.trim())
                .map_err(|e| ExportError::Decode(format!("invalid base64 payload: {}", e))),
            ImageLocator::Embedded { mime_type, .. } => Err(ExportError::Decode(format!(
                "only base64 data URLs are supported (got '{}')",
                mime_type
            ))),
            ImageLocator::Remote(url) => {
                let response = self.client.get(url).send().await.map_err(|e| {
                    ExportError::Decode(format!("cannot reach {}: {}", preview(url), e))
                })?;
                if !response.status().is_success() {
                    return Err(ExportError::Decode(format!(
                        "{} answered {}",
                        preview(url),
                        response.status()
                    )));
                }
                let bytes = response.bytes().await.map_err(|e| {
                    ExportError::Decode(format!("cannot read {}: {}", preview(url), e))
                })?;
                Ok(bytes.to_vec())
            }
        }
    }
}

/// Decodes onto a surface and encodes to `format`. SVG goes through a PNG first.
pub fn render(source: &[u8], format: ExportFormat) -> Result<ExportArtifact, ExportError> {
    let surface = Surface::decode(source)?;

    let bytes = if Surface::supports(format) {
        surface.encode(format)?
    } else {
        let png = surface.encode(ExportFormat::Png)?;
        svg::wrap_png(&png, surface.width(), surface.height()).into_bytes()
    };

    Ok(ExportArtifact::new(format, bytes))
}
