//! Orchestrator API endpoints used to enrich build events

use beacon_core::dto::build::{BuildDetail, BuildDetailResponse, ChangesResponse};

use crate::OrchestratorClient;
use crate::error::{ClientError, Result};

impl OrchestratorClient {
    // =============================================================================
    // Build Detail
    // =============================================================================

    /// Get a build together with all of its properties
    ///
    /// # Arguments
    /// * `build_id` - The orchestrator's build id (not the per-builder number)
    pub async fn get_build(&self, build_id: i64) -> Result<BuildDetail> {
        let url = format!("{}/api/v2/builds/{}", self.base_url, build_id);
        let response = self
            .client
            .get(&url)
            .query(&[("property", "*")])
            .send()
            .await?;

        let detail: BuildDetailResponse = self.handle_response(response).await?;
        detail
            .builds
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(format!("build {}", build_id)))
    }

    // =============================================================================
    // Blame List
    // =============================================================================

    /// Get the source changes attributed to a build
    pub async fn get_build_changes(&self, build_id: i64) -> Result<ChangesResponse> {
        let url = format!("{}/api/v2/builds/{}/changes", self.base_url, build_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get the users responsible for a build's changes
    ///
    /// # Returns
    /// Distinct change authors in order of first appearance
    pub async fn get_responsible_users(&self, build_id: i64) -> Result<Vec<String>> {
        let changes = self.get_build_changes(build_id).await?;
        Ok(changes.responsible_users())
    }
}
