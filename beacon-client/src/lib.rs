//! Beacon HTTP Clients
//!
//! Typed HTTP clients for the two services the notifier talks to:
//! - [`OrchestratorClient`] fetches build detail and blame data used to
//!   enrich incoming build events
//! - [`ChatClient`] posts rendered messages to the chat platform
//!
//! # Example
//!
//! ```no_run
//! use beacon_client::{ApiVariant, ChatClient, OrchestratorClient, SecretRef};
//!
//! #[tokio::main]
//! async fn main() -> beacon_client::Result<()> {
//!     let orchestrator = OrchestratorClient::new("http://localhost:8010");
//!     let users = orchestrator.get_responsible_users(17).await?;
//!     println!("Responsible: {:?}", users);
//!
//!     let chat = ChatClient::new(
//!         "https://slack.com",
//!         ApiVariant::Unified,
//!         SecretRef::parse("env:SLACK_TOKEN"),
//!     );
//!     println!("Posting to {}", chat.base_url());
//!     Ok(())
//! }
//! ```

mod chat;
pub mod error;
mod orchestrator;
mod secret;
#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use chat::{ApiVariant, ChatClient, ChatResponse, HOSTED_BASE_URL};
pub use error::{ClientError, Result};
pub use secret::SecretRef;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the build orchestrator's REST API
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8010")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API (e.g., "http://localhost:8010")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use beacon_client::OrchestratorClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = OrchestratorClient::with_client("http://localhost:8010", http_client);
    /// ```
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

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OrchestratorClient::new("http://localhost:8010");
        assert_eq!(client.base_url(), "http://localhost:8010");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = OrchestratorClient::new("http://localhost:8010/");
        assert_eq!(client.base_url(), "http://localhost:8010");
    }
}
