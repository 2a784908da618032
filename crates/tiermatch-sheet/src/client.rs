//! HTTP client for the published sheet
//!
//! # Features
//!
//! - Cache-busting query parameter on every request
//! - Request timeout
//! - Retry logic with exponential backoff

use crate::csv::parse_sheet;
use crate::SheetError;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tiermatch_domain::PeerRatingMatrix;
use tracing::{debug, warn};

/// Default timeout for sheet requests (15 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Client for the CSV export of the shared sheet
#[derive(Debug, Clone)]
pub struct SheetClient {
    url: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl SheetClient {
    /// Create a client for `url` with the default timeout
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tiermatch_sheet::SheetClient;
    ///
    /// let client = SheetClient::new("https://example.com/pub?output=csv").unwrap();
    /// ```
    pub fn new(url: impl Into<String>) -> Result<Self, SheetError> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, SheetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts (at least one is always made)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Configured sheet URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL with a fresh `_t` parameter so intermediaries do not serve stale data
    pub fn cache_busted_url(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}_t={}", self.url, separator, millis)
    }

    /// Download the raw CSV text
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The server is unreachable or times out on every attempt
    /// - The server answers with a non-success status on every attempt
    pub async fn fetch_csv(&self) -> Result<String, SheetError> {
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            let url = self.cache_busted_url();
            debug!("Fetching sheet (attempt {}): {}", attempts + 1, url);

            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .text()
                        .await
                        .map_err(|e| SheetError::InvalidResponse(format!("Failed to read body: {}", e)));
                }
                Ok(response) => {
                    last_error = Some(SheetError::Http(response.status().as_u16()));
                }
                Err(e) => {
                    last_error = Some(SheetError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Sheet fetch failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| SheetError::Communication("Max retries exceeded".to_string())))
    }

    /// Download and parse the sheet against the canonical idea names
    pub async fn fetch_matrix(&self, canonical: &[String]) -> Result<PeerRatingMatrix, SheetError> {
        let text = self.fetch_csv().await?;
        parse_sheet(&text, canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SheetClient::new("https://example.com/pub?output=csv").unwrap();
        assert_eq!(client.url(), "https://example.com/pub?output=csv");
        assert_eq!(client.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_with_max_retries_keeps_one_attempt() {
        let client = SheetClient::new("https://example.com").unwrap().with_max_retries(0);
        assert_eq!(client.max_retries, 1);
    }

    #[test]
    fn test_cache_busted_url() {
        let with_query = SheetClient::new("https://example.com/pub?output=csv").unwrap();
        assert!(with_query.cache_busted_url().starts_with("https://example.com/pub?output=csv&_t="));

        let bare = SheetClient::new("https://example.com/sheet.csv").unwrap();
        assert!(bare.cache_busted_url().starts_with("https://example.com/sheet.csv?_t="));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_communication_error() {
        // Use an invalid port to trigger an error
        let client = SheetClient::new("http://127.0.0.1:9/sheet.csv")
            .unwrap()
            .with_max_retries(1);

        let result = client.fetch_csv().await;
        assert!(matches!(result, Err(SheetError::Communication(_))));
    }
}
