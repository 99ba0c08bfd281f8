//! Build Event API Handlers
//!
//! Endpoints the orchestrator calls on build lifecycle transitions.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use beacon_core::domain::target::RecipientTarget;
use beacon_core::dto::build::BuildEventBody;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::DeliveryOutcome;

/// Summary of one dispatch returned to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<OutcomeReport>,
}

/// Delivery result for a single target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub target: RecipientTarget,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&DeliveryOutcome> for OutcomeReport {
    fn from(outcome: &DeliveryOutcome) -> Self {
        OutcomeReport {
            target: outcome.target.clone(),
            delivered: outcome.is_delivered(),
            status: outcome.error().and_then(|e| e.status()),
            error: outcome.error().map(|e| e.to_string()),
        }
    }
}

impl From<Vec<DeliveryOutcome>> for DispatchReport {
    fn from(outcomes: Vec<DeliveryOutcome>) -> Self {
        let outcomes: Vec<OutcomeReport> = outcomes.iter().map(OutcomeReport::from).collect();
        let delivered = outcomes.iter().filter(|o| o.delivered).count();
        DispatchReport {
            delivered,
            failed: outcomes.len() - delivered,
            outcomes,
        }
    }
}

// =============================================================================
// Build Lifecycle
// =============================================================================

/// POST /api/builds/started
/// Notify that a build has started
pub async fn build_started(
    State(state): State<AppState>,
    body: Result<Json<BuildEventBody>, JsonRejection>,
) -> ApiResult<Json<DispatchReport>> {
    let Json(body) = body?;
    tracing::info!("Build started: {} #{}", body.builder_name, body.build_number);

    let outcomes = state.dispatcher.on_started(body).await;

    Ok(Json(outcomes.into()))
}

/// POST /api/builds/finished
/// Notify that a build has finished
pub async fn build_finished(
    State(state): State<AppState>,
    body: Result<Json<BuildEventBody>, JsonRejection>,
) -> ApiResult<Json<DispatchReport>> {
    let Json(body) = body?;
    tracing::info!(
        "Build finished: {} #{} ({})",
        body.builder_name,
        body.build_number,
        body.result
    );

    let outcomes = state.dispatcher.on_finished(body).await;

    Ok(Json(outcomes.into()))
}
