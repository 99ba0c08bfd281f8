//! Service layer
//!
//! Services contain the notification logic. They turn build events into
//! chat messages, decide where they go and drive delivery through the
//! repositories.

mod composer;
mod dispatcher;
mod resolver;

pub use composer::MessageComposer;
pub use dispatcher::{DeliveryOutcome, NotificationDispatcher};
pub use resolver::RecipientResolver;
