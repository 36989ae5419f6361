use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-authored description of the image to generate. Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl AsRef<str>) -> Result<Self, GateError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GateError::EmptyPrompt);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Prompt {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Prompt::new(value)
    }
}

impl From<Prompt> for String {
    fn from(prompt: Prompt) -> Self {
        prompt.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_trimmed() {
        let prompt = Prompt::new("  a red balloon \n").unwrap();
        assert_eq!(prompt.as_str(), "a red balloon");
    }

    #[test]
    fn test_blank_prompts_are_rejected() {
        assert_eq!(Prompt::new(""), Err(GateError::EmptyPrompt));
        assert_eq!(Prompt::new(" \t\n"), Err(GateError::EmptyPrompt));
    }

    #[test]
    fn test_prompt_deserialization_validates() {
        assert!(serde_json::from_str::<Prompt>("\"a castle\"").is_ok());
        assert!(serde_json::from_str::<Prompt>("\"   \"").is_err());
    }
}
