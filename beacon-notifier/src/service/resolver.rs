//! Recipient resolver
//!
//! Maps a builder to the chat destinations configured for it.

use beacon_core::domain::target::RecipientTarget;
use std::sync::Arc;

use crate::config::Config;

/// Resolves delivery targets from the static builder maps
pub struct RecipientResolver {
    config: Arc<Config>,
}

impl RecipientResolver {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Targets for `builder_name`: the user target first, then the room
    ///
    /// A builder missing from both maps yields no targets; its events are
    /// composed but delivered to nobody.
    pub fn resolve(&self, builder_name: &str) -> Vec<RecipientTarget> {
        let user = self.config.user_for(builder_name).map(RecipientTarget::user);
        let room = self.config.room_for(builder_name).map(RecipientTarget::room);

        user.into_iter().chain(room).collect()
    }
}
