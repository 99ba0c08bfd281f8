//! Notification dispatcher
//!
//! Runs one build event through the pipeline: enrich, compose, resolve,
//! deliver. Enrichment failures degrade the message instead of dropping it,
//! and every target is delivered independently so one failure never blocks
//! another.

use beacon_core::domain::build::{BuildEvent, EventKind};
use beacon_core::domain::target::RecipientTarget;
use beacon_core::dto::build::BuildEventBody;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::{MessageComposer, RecipientResolver};
use crate::config::Config;
use crate::repository::{BuildDetailRepository, ChatTransport, DeliveryError};

/// Result of delivering one event to one target
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    pub target: RecipientTarget,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }

    pub fn error(&self) -> Option<&DeliveryError> {
        match &self.status {
            DeliveryStatus::Delivered => None,
            DeliveryStatus::Failed(err) => Some(err),
        }
    }
}

/// Orchestrates notification delivery for build events
pub struct NotificationDispatcher {
    composer: MessageComposer,
    resolver: RecipientResolver,
    details: Option<Arc<dyn BuildDetailRepository>>,
    transport: Arc<dyn ChatTransport>,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher
    ///
    /// # Arguments
    /// * `config` - Read-only configuration shared by all dispatches
    /// * `details` - Source of extra build detail; `None` disables enrichment
    /// * `transport` - Delivers composed messages to the chat platform
    pub fn new(
        config: Arc<Config>,
        details: Option<Arc<dyn BuildDetailRepository>>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            composer: MessageComposer::new(Arc::clone(&config)),
            resolver: RecipientResolver::new(config),
            details,
            transport,
        }
    }

    /// Handles a build-started notification
    pub async fn on_started(&self, body: BuildEventBody) -> Vec<DeliveryOutcome> {
        self.dispatch(body.into_event(EventKind::Started)).await
    }

    /// Handles a build-finished notification
    pub async fn on_finished(&self, body: BuildEventBody) -> Vec<DeliveryOutcome> {
        self.dispatch(body.into_event(EventKind::Finished)).await
    }

    /// Processes one event and reports one outcome per resolved target
    pub async fn dispatch(&self, event: BuildEvent) -> Vec<DeliveryOutcome> {
        let span = info_span!(
            "dispatch",
            dispatch_id = %Uuid::new_v4(),
            builder = %event.builder_name,
            build = event.build_number,
            kind = %event.kind,
        );

        self.run(event).instrument(span).await
    }

    async fn run(&self, event: BuildEvent) -> Vec<DeliveryOutcome> {
        let (event, responsible_users) = self.enrich(event).await;

        let payload = self.composer.compose(&event, &responsible_users);
        let targets = self.resolver.resolve(&event.builder_name);

        if !payload.has_text() {
            debug!("Composed message is empty, nothing to send");
            return Vec::new();
        }

        if targets.is_empty() {
            debug!("No recipients configured for builder {}", event.builder_name);
            return Vec::new();
        }

        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            let status = match self.transport.deliver(&target, &payload).await {
                Ok(()) => {
                    info!("Delivered {} notification to {}", event.kind, target);
                    DeliveryStatus::Delivered
                }
                Err(e) => {
                    error!(
                        status = e.status(),
                        "Unable to deliver {} notification to {}: {}",
                        event.kind,
                        target,
                        e
                    );
                    DeliveryStatus::Failed(e)
                }
            };
            outcomes.push(DeliveryOutcome { target, status });
        }

        outcomes
    }

    /// Fills in properties and the blame list where the orchestrator can supply them
    ///
    /// Each lookup is optional: a failure is logged and treated as "no data".
    async fn enrich(&self, event: BuildEvent) -> (BuildEvent, Vec<String>) {
        let Some(details) = &self.details else {
            return (event, Vec::new());
        };

        // Started notifications carry no fields
        if event.kind == EventKind::Started {
            return (event, Vec::new());
        }

        let event = if event.properties.is_none() {
            match details.fetch_properties(event.build_id).await {
                Ok(properties) => event.with_properties(properties),
                Err(e) => {
                    warn!("Continuing without build properties: {:#}", e);
                    event
                }
            }
        } else {
            event
        };

        let responsible_users = match details.fetch_responsible_users(event.build_id).await {
            Ok(users) => users,
            Err(e) => {
                warn!("Continuing without blame list: {:#}", e);
                Vec::new()
            }
        };

        (event, responsible_users)
    }
}
