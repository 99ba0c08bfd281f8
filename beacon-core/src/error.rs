//! Error types shared across Beacon crates

use thiserror::Error;

/// Raised when a caller hands over input that breaks an upstream contract
///
/// This is distinct from normal absence: a missing property is `Ok(None)`,
/// while a missing properties container is an `InvalidInputError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid input: {0}")]
pub struct InvalidInputError(pub String);
