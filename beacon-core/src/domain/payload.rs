//! Chat message payload

use serde::{Deserialize, Serialize};

/// Message body built for one build event
///
/// `fields` is `None` for terse messages (build started) and `Some` for
/// finished builds, even when no optional field could be filled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Destination identifier, empty until merged with a target
    pub channel: String,
    pub text: String,
    pub fallback: String,
    /// Hex color or a named token such as `warning`
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
}

impl MessagePayload {
    /// Whether there is anything worth sending
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Returns a copy addressed to `channel`
    pub fn for_channel(&self, channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..self.clone()
        }
    }
}

/// One titled entry in the message's field block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    /// Creates a field rendered side by side with its neighbours
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }
}
