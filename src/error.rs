use thiserror::Error;

/// Submission or export rejected locally, before anything leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Please login to generate images")]
    Unauthenticated,
    #[error("Please enter a prompt")]
    EmptyPrompt,
    #[error("A generation is already in progress")]
    Busy,
    #[error("Reset the current image before generating another")]
    NotIdle,
    #[error("There is no generated image to reset")]
    NotReady,
    #[error("No generated image is available for export")]
    NoImage,
}

/// Remote generation failed. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub const FALLBACK_MESSAGE: &'static str = "Failed to generate image";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Uses the server-provided reason when there is one, the generic fallback otherwise.
    pub fn from_server(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => Self::new(msg),
            _ => Self::new(Self::FALLBACK_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Download error: {0}")]
    Download(String),
}

#[derive(Debug, Error)]
pub enum PixgenError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PixgenError>;
