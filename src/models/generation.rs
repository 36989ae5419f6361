use super::Prompt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// One submission in flight. Lives only until its result is absorbed or its error surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: Prompt,
    pub status: GenerationStatus,
}

impl GenerationRequest {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            status: GenerationStatus::Idle,
        }
    }

    pub fn submitting(mut self) -> Self {
        self.status = GenerationStatus::Submitting;
        self
    }

    pub fn finish(&mut self, succeeded: bool) {
        self.status = if succeeded {
            GenerationStatus::Succeeded
        } else {
            GenerationStatus::Failed
        };
    }
}
