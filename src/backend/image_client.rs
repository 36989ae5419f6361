use crate::{
    backend::GenerationInvoker,
    config::ClientConfig,
    error::{GenerationError, PixgenError, Result},
    models::{preview, GenerateImagePayload, GenerateImageResponse, GeneratedImage, Prompt},
    session::SessionGate,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

pub const GENERATE_PATH: &str = "/api/image/generate-image";

/// HTTP invoker for the hosted generation backend.
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    endpoint: String,
    session: Arc<dyn SessionGate>,
}

impl ImageClient {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionGate>) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PixgenError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url(), GENERATE_PATH),
            session,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Maps a decoded response body onto the invoker contract.
    fn absorb(
        &self,
        body: GenerateImageResponse,
    ) -> std::result::Result<GeneratedImage, GenerationError> {
        if !body.success {
            return Err(GenerationError::from_server(body.message));
        }

        let locator = body
            .result_image
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| GenerationError::new("The server did not return an image"))?;

        if let Some(credit) = body.credit_balance {
            self.session.update_credit(credit);
        }

        log::info!("Image received: {}", preview(&locator));
        Ok(GeneratedImage::new(locator))
    }
}

#[async_trait]
impl GenerationInvoker for ImageClient {
    async fn generate(
        &self,
        prompt: &Prompt,
    ) -> std::result::Result<GeneratedImage, GenerationError> {
        let token = self.session.token().unwrap_or_default();

        log::info!("Requesting generation from {}", self.endpoint);
        log::debug!("Prompt: {}", prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .header("token", token)
            .json(&GenerateImagePayload {
                prompt: prompt.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                log::error!("Generation request failed: {:?}", e);
                GenerationError::new(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            log::error!("Failed to read generation response: {:?}", e);
            GenerationError::new(format!("Failed to read response: {}", e))
        })?;

        match serde_json::from_str::<GenerateImageResponse>(&text) {
            Ok(body) if status.is_success() => self.absorb(body),
            Ok(body) => {
                log::warn!("Generation endpoint returned {}", status);
                Err(GenerationError::from_server(body.message))
            }
            Err(e) => {
                log::error!("Undecodable generation response ({}): {}", status, e);
                Err(GenerationError::new(format!(
                    "{} ({})",
                    GenerationError::FALLBACK_MESSAGE,
                    status
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        session::StaticSession,
        test_support::{refused_url, OneShot},
    };

    fn client(session: Arc<StaticSession>) -> ImageClient {
        let config = ClientConfig::new().with_backend_url("http://localhost:4000/");
        ImageClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = client(Arc::new(StaticSession::anonymous()));
        assert_eq!(
            client.endpoint(),
            "http://localhost:4000/api/image/generate-image"
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ClientConfig::new().with_backend_url("");
        assert!(ImageClient::new(&config, Arc::new(StaticSession::anonymous())).is_err());
    }

    #[test]
    fn test_absorb_success_updates_credit() {
        let session = Arc::new(StaticSession::authenticated("tok", 5));
        let client = client(session.clone());

        let image = client
            .absorb(GenerateImageResponse {
                success: true,
                message: None,
                result_image: Some("data:image/png;base64,AA==".into()),
                credit_balance: Some(4),
            })
            .unwrap();

        assert_eq!(image.locator(), "data:image/png;base64,AA==");
        assert_eq!(session.credit(), 4);
    }

    #[test]
    fn test_absorb_failure_payload() {
        let client = client(Arc::new(StaticSession::authenticated("tok", 5)));

        let err = client
            .absorb(GenerateImageResponse {
                success: false,
                message: Some("server overloaded".into()),
                result_image: None,
                credit_balance: None,
            })
            .unwrap_err();
        assert_eq!(err.message, "server overloaded");

        let err = client
            .absorb(GenerateImageResponse {
                success: true,
                message: None,
                result_image: None,
                credit_balance: None,
            })
            .unwrap_err();
        assert_eq!(err.message, "The server did not return an image");
    }

    fn served_by(url: &str, session: Arc<StaticSession>) -> ImageClient {
        let config = ClientConfig::new().with_backend_url(url);
        ImageClient::new(&config, session).unwrap()
    }

    fn prompt() -> Prompt {
        Prompt::new("a red balloon").unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_token_and_prompt() {
        let server = OneShot::json(
            "200 OK",
            r#"{"success":true,"resultImage":"data:image/png;base64,AA==","creditBalance":4}"#,
        )
        .await;
        let session = Arc::new(StaticSession::authenticated("tok123", 5));
        let client = served_by(&server.url, session.clone());

        let image = client.generate(&prompt()).await.unwrap();
        assert_eq!(image.locator(), "data:image/png;base64,AA==");
        assert_eq!(session.credit(), 4);

        let request = server.request().await;
        assert!(request.starts_with("POST /api/image/generate-image HTTP/1.1"));
        assert!(request.to_lowercase().contains("\r\ntoken: tok123\r\n"));
        assert!(request.ends_with(r#"{"prompt":"a red balloon"}"#));
    }

    #[tokio::test]
    async fn test_generate_surfaces_server_message() {
        let server = OneShot::json(
            "503 Service Unavailable",
            r#"{"success":false,"message":"server overloaded"}"#,
        )
        .await;
        let session = Arc::new(StaticSession::authenticated("tok123", 5));
        let client = served_by(&server.url, session.clone());

        let err = client.generate(&prompt()).await.unwrap_err();
        assert_eq!(err.message, "server overloaded");
        assert_eq!(session.credit(), 5);
    }

    #[tokio::test]
    async fn test_generate_undecodable_body() {
        let server = OneShot::serve(
            "500 Internal Server Error",
            "text/html",
            b"<html><body>Internal Server Error</body></html>".to_vec(),
        )
        .await;
        let client = served_by(&server.url, Arc::new(StaticSession::authenticated("t", 1)));

        let err = client.generate(&prompt()).await.unwrap_err();
        assert_eq!(
            err.message,
            "Failed to generate image (500 Internal Server Error)"
        );
    }

    #[tokio::test]
    async fn test_generate_connection_refused() {
        let url = refused_url().await;
        let client = served_by(&url, Arc::new(StaticSession::authenticated("t", 1)));

        let err = client.generate(&prompt()).await.unwrap_err();
        assert!(err.message.starts_with("Request failed: "), "{}", err.message);
    }
}
