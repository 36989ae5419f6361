pub mod image_client;

use crate::{
    error::GenerationError,
    models::{GeneratedImage, Prompt},
};
use async_trait::async_trait;

pub use image_client::ImageClient;

/// One remote "generate image from prompt" call. Implementations never retry; every
/// failure, including an explicit unsuccessful payload, comes back as a [`GenerationError`].
#[async_trait]
pub trait GenerationInvoker: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<GeneratedImage, GenerationError>;
}
