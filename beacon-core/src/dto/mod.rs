//! Data Transfer Objects (DTOs)
//!
//! Wire shapes exchanged with the orchestrator. These types are used for
//! HTTP request/response bodies and convert into domain types.

pub mod build;
