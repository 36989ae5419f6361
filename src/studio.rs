use crate::{
    backend::{GenerationInvoker, ImageClient},
    config::ClientConfig,
    controller::RequestController,
    error::{GateError, PixgenError, Result},
    export::{DownloadSurface, FileDownloader, FormatConverter},
    models::{ExportFormat, GeneratedImage},
    notify::Notifier,
    routes::{self, Route, RouteDecision},
    session::SessionGate,
};
use std::{path::PathBuf, sync::Arc};

/// Everything the generate page needs, wired together.
pub struct Studio {
    controller: RequestController,
    converter: FormatConverter,
    downloads: Arc<dyn DownloadSurface>,
    session: Arc<dyn SessionGate>,
    notifier: Arc<dyn Notifier>,
}

impl Studio {
    pub fn new(
        invoker: Arc<dyn GenerationInvoker>,
        downloads: Arc<dyn DownloadSurface>,
        session: Arc<dyn SessionGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            controller: RequestController::new(invoker, session.clone(), notifier.clone()),
            converter: FormatConverter::new(),
            downloads,
            session,
            notifier,
        }
    }

    /// HTTP backend and on-disk downloads as described by `config`.
    pub fn from_config(
        config: &ClientConfig,
        session: Arc<dyn SessionGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let invoker = ImageClient::new(config, session.clone())?;
        let downloads = FileDownloader::new(config.download_dir.clone());
        Ok(Self::new(
            Arc::new(invoker),
            Arc::new(downloads),
            session,
            notifier,
        ))
    }

    pub fn controller(&self) -> &RequestController {
        &self.controller
    }

    pub fn converter(&self) -> &FormatConverter {
        &self.converter
    }

    pub fn session(&self) -> &Arc<dyn SessionGate> {
        &self.session
    }

    pub fn enter(&self, route: Route) -> RouteDecision {
        routes::guard(route, self.session.as_ref(), self.notifier.as_ref())
    }

    pub async fn submit(&self, prompt: &str) -> Result<GeneratedImage> {
        self.controller.submit(prompt).await
    }

    pub fn reset(&self) -> Result<()> {
        self.controller.reset()
    }

    /// Converts the live image and saves it. Any failure is reported as a notice and
    /// returned; nothing is dropped silently.
    pub async fn download(&self, format: ExportFormat) -> Result<PathBuf> {
        let outcome = self.export(format).await;
        match &outcome {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format.filename());
                self.notifier.success(&format!("Saved {}", name));
            }
            Err(err) => {
                log::error!("Export to {} failed: {}", format, err);
                self.notifier.error(&format!("Export failed: {}", err));
            }
        }
        outcome
    }

    async fn export(&self, format: ExportFormat) -> Result<PathBuf> {
        let image = self
            .controller
            .current_image()
            .ok_or(PixgenError::Gate(GateError::NoImage))?;

        let artifact = self.converter.convert(&image, format).await?;
        Ok(self.downloads.save(artifact).await?)
    }
}
