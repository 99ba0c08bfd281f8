//! Build domain types

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Build properties keyed by name
///
/// The orchestrator reports every property as a `[value, source]` pair.
pub type Properties = HashMap<String, PropertyValue>;

/// A single property value together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue(pub serde_json::Value, pub String);

impl PropertyValue {
    pub fn new(value: impl Into<serde_json::Value>, source: impl Into<String>) -> Self {
        Self(value.into(), source.into())
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn source(&self) -> &str {
        &self.1
    }
}

/// Snapshot of a build state change
///
/// Owned by the single dispatch that processes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEvent {
    pub builder_name: String,
    pub build_number: i64,
    pub build_id: i64,
    pub url: String,
    pub state_string: String,
    pub result: BuildResult,
    pub properties: Option<Properties>,
    pub kind: EventKind,
}

impl BuildEvent {
    /// Returns the event with its properties replaced
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Whether the event carries the fields needed to render a message
    pub fn is_well_formed(&self) -> bool {
        !self.builder_name.trim().is_empty() && !self.state_string.trim().is_empty()
    }
}

/// Lifecycle transition that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    Finished,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Started => write!(f, "started"),
            EventKind::Finished => write!(f, "finished"),
        }
    }
}

/// Outcome of a build as reported by the orchestrator
///
/// Deserializes from the orchestrator's numeric result codes, from result
/// names, or from `null` for a build that has not finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "Option<RawResult>")]
pub enum BuildResult {
    Success,
    Warnings,
    Failure,
    Skipped,
    Exception,
    Retry,
    Cancelled,
    #[default]
    NotFinished,
    Unknown,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResult {
    Code(i64),
    Name(String),
}

impl From<Option<RawResult>> for BuildResult {
    fn from(raw: Option<RawResult>) -> Self {
        match raw {
            None => BuildResult::NotFinished,
            Some(RawResult::Code(code)) => BuildResult::from_code(code),
            Some(RawResult::Name(name)) => BuildResult::from_name(&name),
        }
    }
}

impl BuildResult {
    /// Maps the orchestrator's numeric result code
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => BuildResult::Success,
            1 => BuildResult::Warnings,
            2 => BuildResult::Failure,
            3 => BuildResult::Skipped,
            4 => BuildResult::Exception,
            5 => BuildResult::Retry,
            6 => BuildResult::Cancelled,
            _ => BuildResult::Unknown,
        }
    }

    /// Parses a result name, ignoring case and separator style
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "success" => BuildResult::Success,
            "warnings" => BuildResult::Warnings,
            "failure" => BuildResult::Failure,
            "skipped" => BuildResult::Skipped,
            "exception" => BuildResult::Exception,
            "retry" => BuildResult::Retry,
            "cancelled" | "canceled" => BuildResult::Cancelled,
            "not_finished" => BuildResult::NotFinished,
            _ => BuildResult::Unknown,
        }
    }

    /// Normalized name of the result
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "success",
            BuildResult::Warnings => "warnings",
            BuildResult::Failure => "failure",
            BuildResult::Skipped => "skipped",
            BuildResult::Exception => "exception",
            BuildResult::Retry => "retry",
            BuildResult::Cancelled => "cancelled",
            BuildResult::NotFinished => "not_finished",
            BuildResult::Unknown => "unknown",
        }
    }
}

impl Serialize for BuildResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
