//! Build DTOs for orchestrator communication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::build::{BuildEvent, BuildResult, EventKind, Properties};

/// Build event as posted by the orchestrator
///
/// The event kind is implied by the endpoint it arrives on. Text fields
/// default to empty so that an incomplete event is accepted and then skipped
/// instead of being rejected at the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEventBody {
    #[serde(default)]
    pub builder_name: String,
    pub build_number: i64,
    pub build_id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub state_string: String,
    #[serde(default)]
    pub result: BuildResult,
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl BuildEventBody {
    pub fn into_event(self, kind: EventKind) -> BuildEvent {
        BuildEvent {
            builder_name: self.builder_name,
            build_number: self.build_number,
            build_id: self.build_id,
            url: self.url,
            state_string: self.state_string,
            result: self.result,
            properties: self.properties,
            kind,
        }
    }
}

/// Response of `GET /api/v2/builds/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDetailResponse {
    pub builds: Vec<BuildDetail>,
}

/// Full build record including properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDetail {
    pub buildid: i64,
    pub number: i64,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub complete_at: Option<DateTime<Utc>>,
}

impl BuildDetail {
    /// Wall-clock duration of a finished build
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.complete_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Response of `GET /api/v2/builds/{id}/changes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangesResponse {
    pub changes: Vec<Change>,
}

/// A source change attributed to a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub author: String,
    #[serde(default)]
    pub revision: Option<String>,
}

impl ChangesResponse {
    /// Distinct authors of the changes, in order of first appearance
    pub fn responsible_users(&self) -> Vec<String> {
        let mut users: Vec<String> = Vec::new();
        for change in &self.changes {
            let author = change.author.trim();
            if !author.is_empty() && !users.iter().any(|u| u == author) {
                users.push(author.to_string());
            }
        }
        users
    }
}
