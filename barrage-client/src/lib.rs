//! Barrage HTTP Client
//!
//! A small, type-safe client for the Barrage orchestrator's job control API.
//!
//! # Example
//!
//! ```no_run
//! use barrage_client::BarrageClient;
//! use barrage_core::domain::profile::LoadProfile;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), barrage_client::ClientError> {
//!     let client = BarrageClient::new("http://localhost:8080");
//!
//!     let job_id = client
//!         .submit_job(&LoadProfile::new("https://example.com/", 100))
//!         .await?;
//!
//!     let poll = client.poll_job(job_id).await?;
//!     println!("{}: {}/{}", poll.status, poll.progress, poll.total);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Barrage orchestrator API
#[derive(Debug, Clone)]
pub struct BarrageClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl BarrageClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use barrage_client::BarrageClient;
    ///
    /// let client = BarrageClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check orchestrator liveness
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        Self::check_status(response).await.map(|_| ())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Turns a non-2xx response into `ClientError::ApiError`
    ///
    /// The orchestrator reports failures as `{"error": message}`; other bodies
    /// are passed through verbatim.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(body);

        tracing::debug!("API error {}: {}", status, message);
        Err(ClientError::api_error(status.as_u16(), message))
    }
}
