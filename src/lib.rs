pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod logger;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;
pub mod studio;

#[cfg(test)]
mod test_support;

pub use backend::{GenerationInvoker, ImageClient};
pub use config::ClientConfig;
pub use controller::{Phase, RequestController, ViewState};
pub use error::{ExportError, GateError, GenerationError, PixgenError, Result};
pub use export::{DownloadSurface, FileDownloader, FormatConverter};
pub use models::{ExportArtifact, ExportFormat, GeneratedImage, Prompt};
pub use notify::{LogNotifier, Notice, NoticeBoard, NoticeLevel, Notifier};
pub use routes::{Route, RouteDecision};
pub use session::{SessionGate, StaticSession, User};
pub use studio::Studio;
