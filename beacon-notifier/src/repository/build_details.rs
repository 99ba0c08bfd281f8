//! Build detail repository
//!
//! Fetches the extra build data an event does not carry by itself: the full
//! property set and the blame list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use beacon_client::OrchestratorClient;
use beacon_core::domain::build::Properties;
use tracing::debug;

/// Repository trait for build detail lookups against the orchestrator
#[async_trait]
pub trait BuildDetailRepository: Send + Sync {
    /// Fetches all properties of a build
    ///
    /// # Arguments
    /// * `build_id` - The orchestrator's build id
    async fn fetch_properties(&self, build_id: i64) -> Result<Properties>;

    /// Fetches the users responsible for the changes in a build
    async fn fetch_responsible_users(&self, build_id: i64) -> Result<Vec<String>>;
}

/// HTTP implementation of BuildDetailRepository
pub struct HttpBuildDetailRepository {
    client: OrchestratorClient,
}

impl HttpBuildDetailRepository {
    /// Creates a new HTTP build detail repository
    pub fn new(client: OrchestratorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BuildDetailRepository for HttpBuildDetailRepository {
    async fn fetch_properties(&self, build_id: i64) -> Result<Properties> {
        let build = self
            .client
            .get_build(build_id)
            .await
            .context("Failed to fetch build detail")?;

        if let Some(duration) = build.duration() {
            debug!(
                "Build {} (#{}) ran for {}s",
                build_id,
                build.number,
                duration.num_seconds()
            );
        }

        build
            .properties
            .with_context(|| format!("Build {} has no properties", build_id))
    }

    async fn fetch_responsible_users(&self, build_id: i64) -> Result<Vec<String>> {
        self.client
            .get_responsible_users(build_id)
            .await
            .context("Failed to fetch responsible users")
    }
}
