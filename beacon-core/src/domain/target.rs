//! Delivery target types

use serde::{Deserialize, Serialize};

/// Kind of chat destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Direct message to a single user
    User,

    /// Post to a shared room or channel
    Room,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::User => write!(f, "user"),
            TargetKind::Room => write!(f, "room"),
        }
    }
}

/// A resolved chat destination for one notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientTarget {
    pub kind: TargetKind,
    pub identifier: String,
}

impl RecipientTarget {
    pub fn user(identifier: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::User,
            identifier: identifier.into(),
        }
    }

    pub fn room(identifier: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Room,
            identifier: identifier.into(),
        }
    }
}

impl std::fmt::Display for RecipientTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.identifier)
    }
}
