use std::time::Duration;

use crate::errors::ClientError;

/// Configuration for the experiment service connection.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Base URL of the training service.
    pub base_url: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Creates a config pointing at the given service URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Builds a config from `EXLAB_API_URL`, falling back to the local
    /// development service address.
    pub fn from_env() -> Self {
        let base_url = std::env::var("EXLAB_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        Self::new(base_url)
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config(
                "service base_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
