//! Secret references
//!
//! An auth token may be given literally or as a reference that is resolved
//! right before the first request that needs it:
//! - `env:NAME` reads the environment variable `NAME`
//! - `file:PATH` reads the file at `PATH`, trimming surrounding whitespace
//! - anything else is used verbatim

use crate::error::{ClientError, Result};

/// A secret value or a pointer to where it lives
#[derive(Clone, PartialEq, Eq)]
pub enum SecretRef {
    Literal(String),
    Env(String),
    File(String),
}

impl SecretRef {
    /// Parses the `env:` / `file:` reference syntax
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix("env:") {
            SecretRef::Env(name.to_string())
        } else if let Some(path) = raw.strip_prefix("file:") {
            SecretRef::File(path.to_string())
        } else {
            SecretRef::Literal(raw.to_string())
        }
    }

    /// Produces the secret value
    pub async fn resolve(&self) -> Result<String> {
        let value = match self {
            SecretRef::Literal(value) => value.clone(),
            SecretRef::Env(name) => std::env::var(name).map_err(|_| {
                ClientError::SecretUnavailable(format!("environment variable {} not set", name))
            })?,
            SecretRef::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| {
                    ClientError::SecretUnavailable(format!("cannot read {}: {}", path, e))
                })?
                .trim()
                .to_string(),
        };

        if value.is_empty() {
            return Err(ClientError::SecretUnavailable(
                "resolved secret is empty".to_string(),
            ));
        }

        Ok(value)
    }
}

// Never print the secret itself
impl std::fmt::Debug for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretRef::Literal(_) => write!(f, "SecretRef::Literal(***)"),
            SecretRef::Env(name) => write!(f, "SecretRef::Env({})", name),
            SecretRef::File(path) => write!(f, "SecretRef::File({})", path),
        }
    }
}
