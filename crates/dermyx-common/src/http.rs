use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;
use crate::error::DermyxError;

/// An HTTP client capped to the host it was built for.
///
/// The remote store adapter and the classifier client each build one from
/// their configured base URL, so a malformed or injected path can never send
/// the API key somewhere else.
#[derive(Debug, Clone)]
pub struct ScopedClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl ScopedClient {
    /// Build a client allowed to talk to the host of `base_url` only.
    pub fn for_base_url(base_url: &str, timeout: Duration) -> Result<Self, DermyxError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| DermyxError::Config(format!("invalid base URL {base_url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| DermyxError::Config(format!("base URL has no host: {base_url}")))?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| DermyxError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, host: host.to_string(), timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Host names compare exactly; aliases of the base host are refused.
    pub fn is_allowed(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h == self.host))
            .unwrap_or(false)
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, DermyxError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, DermyxError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    fn check(&self, url: &str) -> Result<(), DermyxError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(DermyxError::HostNotAllowed(url.to_string()))
        }
    }
}
