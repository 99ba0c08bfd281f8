//! Repository layer
//!
//! Repositories are thin adapters over the HTTP clients. They give the
//! dispatcher focused interfaces for fetching build detail and delivering
//! messages without any business logic of their own.
//!
//! All repositories are trait-based to enable testing and mocking.

mod build_details;
mod chat;
#[cfg(test)]
pub mod mock;

// Re-export traits
pub use build_details::BuildDetailRepository;
pub use chat::ChatTransport;

// Re-export implementations
pub use build_details::HttpBuildDetailRepository;
pub use chat::{DeliveryError, HttpChatTransport};
