//! Chat transport
//!
//! Delivers one composed message to one resolved target and classifies the
//! result. Failures are returned as values; nothing here escalates.

use async_trait::async_trait;
use beacon_client::{ChatClient, ClientError};
use beacon_core::domain::payload::MessagePayload;
use beacon_core::domain::target::RecipientTarget;
use thiserror::Error;

/// Why a single delivery failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Chat API answered with a non-success status
    #[error("chat API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// Chat API accepted the request but refused the message
    #[error("message rejected: {0}")]
    Rejected(String),

    /// The auth token could not be resolved
    #[error("auth token unavailable: {0}")]
    Auth(String),

    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for DeliveryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, message } => DeliveryError::Api {
                status,
                body: message,
            },
            ClientError::Rejected(reason) => DeliveryError::Rejected(reason),
            ClientError::SecretUnavailable(reason) => DeliveryError::Auth(reason),
            other => DeliveryError::Transport(other.to_string()),
        }
    }
}

/// Transport trait for posting messages to the chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Delivers `payload` to `target`
    ///
    /// The implementation addresses the payload to the target itself; the
    /// `channel` of the payload passed in is ignored.
    async fn deliver(
        &self,
        target: &RecipientTarget,
        payload: &MessagePayload,
    ) -> Result<(), DeliveryError>;
}

/// HTTP implementation of ChatTransport
pub struct HttpChatTransport {
    client: ChatClient,
}

impl HttpChatTransport {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn deliver(
        &self,
        target: &RecipientTarget,
        payload: &MessagePayload,
    ) -> Result<(), DeliveryError> {
        self.client.post_message(target, payload).await?;
        Ok(())
    }
}
