use crate::{error::PixgenError, models::ExportFormat};
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub token: Option<String>,
    pub credit: Option<u64>,
    pub download_dir: PathBuf,
    pub default_format: ExportFormat,
    pub request_timeout: Duration,
    pub notice_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            token: None,
            credit: None,
            download_dir: PathBuf::from("."),
            default_format: ExportFormat::default(),
            request_timeout: Duration::from_secs(120),
            notice_ttl: Duration::from_millis(5000),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `PIXGEN_*` variables; anything missing or unparsable keeps its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let backend_url = env::var("PIXGEN_BACKEND_URL").unwrap_or(defaults.backend_url);
        let token = env::var("PIXGEN_TOKEN").ok().filter(|t| !t.is_empty());
        let credit = env::var("PIXGEN_CREDIT").ok().and_then(|s| s.parse().ok());
        let download_dir = env::var("PIXGEN_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.download_dir);
        let default_format = env::var("PIXGEN_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_format);
        let request_timeout = env::var("PIXGEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let notice_ttl = env::var("PIXGEN_NOTICE_TTL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.notice_ttl);

        ClientConfig {
            backend_url,
            token,
            credit,
            download_dir,
            default_format,
            request_timeout,
            notice_ttl,
        }
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_credit(mut self, credit: u64) -> Self {
        self.credit = Some(credit);
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Backend base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<(), PixgenError> {
        if self.base_url().trim().is_empty() {
            return Err(PixgenError::Config("Backend URL is required".into()));
        }
        if !self.base_url().starts_with("http://") && !self.base_url().starts_with("https://") {
            return Err(PixgenError::Config(format!(
                "Backend URL must be http(s): {}",
                self.backend_url
            )));
        }
        Ok(())
    }
}
