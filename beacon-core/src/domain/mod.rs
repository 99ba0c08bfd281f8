//! Core domain types
//!
//! This module contains the structures that flow through the notification
//! pipeline: the event received from the orchestrator, the chat payload
//! built from it and the targets it is delivered to.

pub mod build;
pub mod payload;
pub mod target;
