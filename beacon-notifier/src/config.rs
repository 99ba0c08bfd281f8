//! Notifier configuration
//!
//! Loaded once at startup from a JSON file and shared read-only by every
//! dispatch. The raw document is checked key by key so that a malformed
//! file is reported precisely before any event is processed.

use beacon_client::{ApiVariant, HOSTED_BASE_URL, SecretRef};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Notifier configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat API token, possibly a reference resolved on first send
    pub auth_token: SecretRef,

    /// Chat API base URL (e.g., "https://slack.com")
    pub endpoint: String,

    /// Address form and auth scheme of the chat API
    pub api_variant: ApiVariant,

    /// Builder name -> room id
    pub builder_room_map: HashMap<String, String>,

    /// Builder name -> user id
    pub builder_user_map: HashMap<String, String>,

    /// Builder name -> extra properties rendered as message fields
    pub builder_custom_message_property: HashMap<String, Vec<String>>,

    /// Orchestrator base URL used to enrich events; enrichment is skipped when unset
    pub orchestrator_url: Option<String>,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults and no builder maps
    pub fn new(auth_token: SecretRef) -> Self {
        Self {
            auth_token,
            endpoint: HOSTED_BASE_URL.to_string(),
            api_variant: ApiVariant::default(),
            builder_room_map: HashMap::new(),
            builder_user_map: HashMap::new(),
            builder_custom_message_property: HashMap::new(),
            orchestrator_url: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Reads and checks the JSON config file at `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        Self::from_value(&value)
    }

    /// Builds the configuration from a parsed JSON document
    ///
    /// Recognised keys:
    /// - auth_token (required, string)
    /// - endpoint (optional, string, default: https://slack.com)
    /// - api_variant (optional, "unified" | "legacy", default: unified)
    /// - builder_room_map / builder_user_map (optional, object of strings)
    /// - builder_custom_message_property (optional, object of string arrays)
    /// - orchestrator_url (optional, string)
    /// - request_timeout_secs (optional, positive integer, default: 30)
    pub fn from_value(value: &Value) -> Result<Self> {
        let doc = value
            .as_object()
            .ok_or_else(|| ConfigError::Invalid("configuration must be a JSON object".to_string()))?;

        let auth_token = optional_string(doc, "auth_token")?.ok_or(ConfigError::Missing("auth_token"))?;

        let mut config = Self::new(SecretRef::parse(&auth_token));

        if let Some(endpoint) = optional_string(doc, "endpoint")? {
            config.endpoint = endpoint;
        }

        if let Some(variant) = optional_string(doc, "api_variant")? {
            config.api_variant = match variant.as_str() {
                "unified" => ApiVariant::Unified,
                "legacy" => ApiVariant::Legacy,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "api_variant must be 'unified' or 'legacy', got '{}'",
                        other
                    )));
                }
            };
        }

        config.builder_room_map = string_map(doc, "builder_room_map")?;
        config.builder_user_map = string_map(doc, "builder_user_map")?;
        config.builder_custom_message_property = string_list_map(doc, "builder_custom_message_property")?;
        config.orchestrator_url = optional_string(doc, "orchestrator_url")?;

        match doc.get("request_timeout_secs") {
            None | Some(Value::Null) => {}
            Some(value) => {
                let secs = value.as_u64().ok_or_else(|| {
                    ConfigError::Invalid("request_timeout_secs must be a positive integer".to_string())
                })?;
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        Ok(config)
    }

    /// Applies overrides from the process environment
    ///
    /// - BEACON_AUTH_TOKEN replaces auth_token
    /// - BEACON_CHAT_ENDPOINT replaces endpoint
    /// - BEACON_ORCHESTRATOR_URL replaces orchestrator_url
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("BEACON_AUTH_TOKEN") {
            self.auth_token = SecretRef::parse(&token);
        }
        if let Some(endpoint) = lookup("BEACON_CHAT_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(url) = lookup("BEACON_ORCHESTRATOR_URL") {
            self.orchestrator_url = Some(url);
        }
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth_token == SecretRef::Literal(String::new()) {
            return Err(ConfigError::Invalid("auth_token cannot be empty".to_string()));
        }

        if !is_http_url(&self.endpoint) {
            return Err(ConfigError::Invalid(
                "endpoint must be an http:// or https:// URL".to_string(),
            ));
        }

        if let Some(url) = &self.orchestrator_url {
            if !is_http_url(url) {
                return Err(ConfigError::Invalid(
                    "orchestrator_url must be an http:// or https:// URL".to_string(),
                ));
            }
        }

        if self.request_timeout.as_secs() == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn room_for(&self, builder_name: &str) -> Option<&str> {
        self.builder_room_map.get(builder_name).map(String::as_str)
    }

    pub fn user_for(&self, builder_name: &str) -> Option<&str> {
        self.builder_user_map.get(builder_name).map(String::as_str)
    }

    /// Custom property names configured for a builder, empty if none
    pub fn custom_properties_for(&self, builder_name: &str) -> &[String] {
        self.builder_custom_message_property
            .get(builder_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn is_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.has_host()
                && !parsed.cannot_be_a_base()
        }
        Err(_) => false,
    }
}

fn optional_string(doc: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::Invalid(format!("{} must be a string", key))),
    }
}

fn mapping<'a>(doc: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Map<String, Value>>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ConfigError::Invalid(format!("{} must be a mapping", key))),
    }
}

fn string_map(doc: &Map<String, Value>, key: &str) -> Result<HashMap<String, String>> {
    let Some(map) = mapping(doc, key)? else {
        return Ok(HashMap::new());
    };

    map.iter()
        .map(|(builder, value)| match value {
            Value::String(s) => Ok((builder.clone(), s.clone())),
            _ => Err(ConfigError::Invalid(format!(
                "{}.{} must be a string",
                key, builder
            ))),
        })
        .collect()
}

fn string_list_map(doc: &Map<String, Value>, key: &str) -> Result<HashMap<String, Vec<String>>> {
    let Some(map) = mapping(doc, key)? else {
        return Ok(HashMap::new());
    };

    let invalid = |builder: &str| ConfigError::Invalid(format!("{}.{} must be a list of strings", key, builder));

    map.iter()
        .map(|(builder, value)| {
            let items = value.as_array().ok_or_else(|| invalid(builder.as_str()))?;
            let names = items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(builder.as_str())))
                .collect::<Result<Vec<_>>>()?;
            Ok((builder.clone(), names))
        })
        .collect()
}
