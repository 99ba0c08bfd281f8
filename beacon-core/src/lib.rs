//! Beacon Core
//!
//! Core types and abstractions for the Beacon build notifier.
//!
//! This crate contains:
//! - Domain types: build events, chat payloads and delivery targets
//! - DTOs: wire shapes exchanged with the orchestrator
//! - Property access: typed reads over loosely-typed build properties

pub mod domain;
pub mod dto;
pub mod error;
pub mod properties;
