//! HTTP client for fetching the navigation document.

use reqwest::Client;
use tracing::{debug, info};

use crate::{Config, Error, Result};

/// HTTP client for fetching the remote navigation document.
///
/// Carries the configured timeout and user agent. The body is decoded using
/// the charset declared in the `Content-Type` header, defaulting to UTF-8,
/// with undecodable bytes replaced rather than treated as fatal.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a new fetcher from the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Fetches a URL and returns the leniently decoded body.
    ///
    /// Non-success statuses become [`Error::Status`]; transport failures and
    /// timeouts become [`Error::Network`].
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching navigation document");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
