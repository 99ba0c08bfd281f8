//! Chat platform client
//!
//! Posts rendered messages to the chat API. Two address forms exist:
//! - `unified`: `POST /api/chat.postMessage` with a bearer token, the
//!   destination carried in the body's `channel`
//! - `legacy`: `POST /v2/user/{id}/message` or `/v2/room/{id}/notification`
//!   with the token passed as the `auth_token` query parameter

use beacon_core::domain::payload::{Field, MessagePayload};
use beacon_core::domain::target::{RecipientTarget, TargetKind};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::secret::SecretRef;

/// Default hosted endpoint of the chat platform
pub const HOSTED_BASE_URL: &str = "https://slack.com";

/// Which API address form and auth scheme to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVariant {
    #[default]
    Unified,
    Legacy,
}

/// Raw response of a successful post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub status: u16,
    pub body: String,
}

/// Wire body: the payload as a single attachment
#[derive(Serialize)]
struct WireMessage<'a> {
    channel: &'a str,
    attachments: [WireAttachment<'a>; 1],
}

#[derive(Serialize)]
struct WireAttachment<'a> {
    fallback: &'a str,
    text: &'a str,
    color: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [Field]>,
}

impl<'a> From<&'a MessagePayload> for WireMessage<'a> {
    fn from(payload: &'a MessagePayload) -> Self {
        Self {
            channel: &payload.channel,
            attachments: [WireAttachment {
                fallback: &payload.fallback,
                text: &payload.text,
                color: &payload.color,
                fields: payload.fields.as_deref(),
            }],
        }
    }
}

/// HTTP client for the chat platform API
///
/// The auth token is resolved from its [`SecretRef`] on the first post and
/// cached for the lifetime of the client.
pub struct ChatClient {
    /// Base URL of the chat API (e.g., "https://slack.com")
    base_url: String,
    variant: ApiVariant,
    secret: SecretRef,
    token: OnceCell<String>,
    client: Client,
}

impl ChatClient {
    /// Create a new chat client with a default HTTP client
    pub fn new(base_url: impl Into<String>, variant: ApiVariant, secret: SecretRef) -> Self {
        Self::with_client(base_url, variant, secret, Client::new())
    }

    /// Create a new chat client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        variant: ApiVariant,
        secret: SecretRef,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            variant,
            secret,
            token: OnceCell::new(),
            client,
        }
    }

    /// Get the base URL of the chat API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path segments a message for `target` is posted to
    pub fn path_for(&self, target: &RecipientTarget) -> Vec<String> {
        match (self.variant, target.kind) {
            (ApiVariant::Unified, _) => vec!["api".to_string(), "chat.postMessage".to_string()],
            (ApiVariant::Legacy, TargetKind::User) => vec![
                "v2".to_string(),
                "user".to_string(),
                target.identifier.clone(),
                "message".to_string(),
            ],
            (ApiVariant::Legacy, TargetKind::Room) => vec![
                "v2".to_string(),
                "room".to_string(),
                target.identifier.clone(),
                "notification".to_string(),
            ],
        }
    }

    /// Deliver `payload` to `target`
    ///
    /// The target's identifier is written into the payload's `channel`.
    pub async fn post_message(
        &self,
        target: &RecipientTarget,
        payload: &MessagePayload,
    ) -> Result<ChatResponse> {
        let addressed = payload.for_channel(target.identifier.clone());
        let segments = self.path_for(target);
        self.post(&segments, &WireMessage::from(&addressed)).await
    }

    /// Send one authenticated POST with a JSON body
    pub async fn post<S, T>(&self, segments: &[S], body: &T) -> Result<ChatResponse>
    where
        S: AsRef<str>,
        T: Serialize + ?Sized,
    {
        let url = self.url_for(segments)?;
        let token = self.token().await?;

        debug!("Posting chat message to {}", url.path());

        let request = match self.variant {
            ApiVariant::Unified => self.client.post(url).bearer_auth(token),
            ApiVariant::Legacy => self.client.post(url).query(&[("auth_token", token)]),
        };

        let response = request.json(body).send().await?;
        self.handle_response(response).await
    }

    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async { self.secret.resolve().await })
            .await?;
        Ok(token.as_str())
    }

    fn url_for<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid endpoint {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("endpoint {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Classify the response of a post
    ///
    /// Non-2xx statuses become [`ClientError::ApiError`] carrying the body. The
    /// unified API also reports failures as `200 {"ok": false}`, which become
    /// [`ClientError::Rejected`].
    async fn handle_response(&self, response: reqwest::Response) -> Result<ChatResponse> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), body));
        }

        if self.variant == ApiVariant::Unified {
            if let Ok(ack) = serde_json::from_str::<UnifiedAck>(&body) {
                if !ack.ok {
                    return Err(ClientError::Rejected(
                        ack.error.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
            }
        }

        Ok(ChatResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("variant", &self.variant)
            .field("secret", &self.secret)
            .field("token_resolved", &self.token.initialized())
            .finish()
    }
}

#[derive(Deserialize)]
struct UnifiedAck {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_server;
    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        authorization: Option<String>,
        query: HashMap<String, String>,
        body: Value,
    }

    type Log = Arc<Mutex<Vec<Captured>>>;

    fn payload() -> MessagePayload {
        MessagePayload {
            channel: String::new(),
            text: "<http://ci/1|build-1 # 42 - build successful>".to_string(),
            fallback: "build successful - http://ci/1".to_string(),
            color: "#8d4".to_string(),
            fields: Some(vec![Field::short("Tag", "v1.2")]),
        }
    }

    fn capture(path: String, headers: &HeaderMap, query: HashMap<String, String>, body: Value) -> Captured {
        Captured {
            path,
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            query,
            body,
        }
    }

    fn unified_router(log: Log, reply: Value) -> Router {
        Router::new()
            .route(
                "/api/chat.postMessage",
                post(
                    move |State(log): State<Log>,
                          headers: HeaderMap,
                          Query(query): Query<HashMap<String, String>>,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            log.lock().unwrap().push(capture(
                                "/api/chat.postMessage".to_string(),
                                &headers,
                                query,
                                body,
                            ));
                            Json(reply)
                        }
                    },
                ),
            )
            .with_state(log)
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ChatClient::new(
            "https://slack.com/",
            ApiVariant::Unified,
            SecretRef::parse("t"),
        );
        assert_eq!(client.base_url(), "https://slack.com");
    }

    #[test]
    fn test_path_for_variants() {
        let unified = ChatClient::new(HOSTED_BASE_URL, ApiVariant::Unified, SecretRef::parse("t"));
        assert_eq!(
            unified.path_for(&RecipientTarget::user("U1")),
            vec!["api", "chat.postMessage"]
        );

        let legacy = ChatClient::new(HOSTED_BASE_URL, ApiVariant::Legacy, SecretRef::parse("t"));
        assert_eq!(
            legacy.path_for(&RecipientTarget::user("dev@example.com")),
            vec!["v2", "user", "dev@example.com", "message"]
        );
        assert_eq!(
            legacy.path_for(&RecipientTarget::room("ops")),
            vec!["v2", "room", "ops", "notification"]
        );
    }

    #[test]
    fn test_wire_message_shape() {
        let addressed = payload().for_channel("C123");
        let wire = serde_json::to_value(WireMessage::from(&addressed)).unwrap();

        assert_eq!(wire["channel"], "C123");
        assert_eq!(wire["attachments"][0]["color"], "#8d4");
        assert_eq!(wire["attachments"][0]["fields"][0]["title"], "Tag");
        assert_eq!(wire["attachments"][0]["fields"][0]["short"], true);
    }

    #[test]
    fn test_wire_message_omits_missing_fields() {
        let mut started = payload();
        started.fields = None;
        let wire = serde_json::to_value(WireMessage::from(&started)).unwrap();
        assert!(wire["attachments"][0].get("fields").is_none());
    }

    #[tokio::test]
    async fn test_unified_post_uses_bearer_and_channel() {
        let log: Log = Arc::default();
        let base = spawn_server(unified_router(log.clone(), json!({"ok": true}))).await;

        let client = ChatClient::new(base, ApiVariant::Unified, SecretRef::parse("xoxb-1"));
        let response = client
            .post_message(&RecipientTarget::room("C123"), &payload())
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let captured = log.lock().unwrap().clone();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].authorization.as_deref(), Some("Bearer xoxb-1"));
        assert!(captured[0].query.is_empty());
        assert_eq!(captured[0].body["channel"], "C123");
        assert_eq!(
            captured[0].body["attachments"][0]["text"],
            "<http://ci/1|build-1 # 42 - build successful>"
        );
    }

    #[tokio::test]
    async fn test_unified_ok_false_is_rejected() {
        let log: Log = Arc::default();
        let base = spawn_server(unified_router(
            log,
            json!({"ok": false, "error": "channel_not_found"}),
        ))
        .await;

        let client = ChatClient::new(base, ApiVariant::Unified, SecretRef::parse("xoxb-1"));
        let err = client
            .post_message(&RecipientTarget::room("C404"), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected(ref e) if e == "channel_not_found"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let router = Router::new().route(
            "/api/chat.postMessage",
            post(|| async { (StatusCode::NOT_FOUND, "no such endpoint") }),
        );
        let base = spawn_server(router).await;

        let client = ChatClient::new(base, ApiVariant::Unified, SecretRef::parse("xoxb-1"));
        let err = client
            .post_message(&RecipientTarget::room("C123"), &payload())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::ApiError { status: 404, ref message } if message == "no such endpoint"
        ));
    }

    #[tokio::test]
    async fn test_legacy_post_uses_query_token_and_room_path() {
        let log: Log = Arc::default();
        let router = Router::new()
            .route(
                "/v2/room/{id}/notification",
                post(
                    |State(log): State<Log>,
                     Path(id): Path<String>,
                     headers: HeaderMap,
                     Query(query): Query<HashMap<String, String>>,
                     Json(body): Json<Value>| async move {
                        log.lock().unwrap().push(capture(
                            format!("/v2/room/{}/notification", id),
                            &headers,
                            query,
                            body,
                        ));
                        StatusCode::NO_CONTENT
                    },
                ),
            )
            .with_state(log.clone());
        let base = spawn_server(router).await;

        let client = ChatClient::new(base, ApiVariant::Legacy, SecretRef::parse("legacy-token"));
        let response = client
            .post_message(&RecipientTarget::room("ops"), &payload())
            .await
            .unwrap();
        assert_eq!(response.status, 204);

        let captured = log.lock().unwrap().clone();
        assert_eq!(captured[0].path, "/v2/room/ops/notification");
        assert_eq!(
            captured[0].query.get("auth_token").map(String::as_str),
            Some("legacy-token")
        );
        assert!(captured[0].authorization.is_none());
        assert_eq!(captured[0].body["channel"], "ops");
    }

    #[tokio::test]
    async fn test_unresolvable_secret_fails_before_sending() {
        let client = ChatClient::new(
            "http://127.0.0.1:9",
            ApiVariant::Unified,
            SecretRef::parse("env:BEACON_TEST_TOKEN_THAT_IS_NEVER_SET"),
        );
        let err = client
            .post_message(&RecipientTarget::room("C123"), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SecretUnavailable(_)));
    }
}
