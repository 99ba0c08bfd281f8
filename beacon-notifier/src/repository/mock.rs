//! Hand-written repository doubles for tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use beacon_core::domain::build::Properties;
use beacon_core::domain::payload::MessagePayload;
use beacon_core::domain::target::RecipientTarget;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BuildDetailRepository, ChatTransport, DeliveryError};

/// Records every delivery and fails those addressed to configured identifiers
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(RecipientTarget, MessagePayload)>>,
    failures: HashMap<String, u16>,
}

impl RecordingTransport {
    /// Makes deliveries to `identifier` fail with `status`
    pub fn failing(mut self, identifier: &str, status: u16) -> Self {
        self.failures.insert(identifier.to_string(), status);
        self
    }

    pub fn sent(&self) -> Vec<(RecipientTarget, MessagePayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn deliver(
        &self,
        target: &RecipientTarget,
        payload: &MessagePayload,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), payload.for_channel(target.identifier.clone())));

        match self.failures.get(&target.identifier) {
            Some(status) => Err(DeliveryError::Api {
                status: *status,
                body: "not_found".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Serves canned build detail, or fails when nothing is configured
#[derive(Default)]
pub struct StaticBuildDetails {
    properties: Option<Properties>,
    responsible_users: Option<Vec<String>>,
    lookups: AtomicUsize,
}

impl StaticBuildDetails {
    pub fn new(properties: Option<Properties>, responsible_users: Option<Vec<String>>) -> Self {
        StaticBuildDetails {
            properties,
            responsible_users,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildDetailRepository for StaticBuildDetails {
    async fn fetch_properties(&self, build_id: i64) -> Result<Properties> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.properties
            .clone()
            .ok_or_else(|| anyhow!("build {} not found", build_id))
    }

    async fn fetch_responsible_users(&self, build_id: i64) -> Result<Vec<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.responsible_users
            .clone()
            .ok_or_else(|| anyhow!("changes for build {} unavailable", build_id))
    }
}
