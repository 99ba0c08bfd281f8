//! Message composer
//!
//! Renders a build event into a chat payload. Every field in the finished
//! message is optional on its own, so missing build metadata only shrinks the
//! message instead of blocking it.

use beacon_core::domain::build::{BuildEvent, BuildResult, EventKind};
use beacon_core::domain::payload::{Field, MessagePayload};
use beacon_core::properties;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;

/// Property holding the tag or `git describe` output of the build
pub const COMMIT_DESCRIPTION_PROPERTY: &str = "commit-description";

/// Property holding the name of the worker that ran the build
pub const WORKER_NAME_PROPERTY: &str = "workername";

/// Color used for results without a dedicated entry
pub const NEUTRAL_COLOR: &str = "warning";

/// Maps a build result to the attachment color
pub fn color_for(result: BuildResult) -> &'static str {
    match result {
        BuildResult::Success => "#8d4",
        BuildResult::Failure => "#ff0000",
        BuildResult::Skipped => "#AADDEE",
        BuildResult::Exception => "#c6c",
        BuildResult::Retry | BuildResult::Cancelled => "#ecc",
        BuildResult::Warnings | BuildResult::NotFinished | BuildResult::Unknown => NEUTRAL_COLOR,
    }
}

/// Builds chat payloads from build events
pub struct MessageComposer {
    config: Arc<Config>,
}

impl MessageComposer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Composes the payload for `event`
    ///
    /// # Arguments
    /// * `event` - The build event, already enriched with properties if available
    /// * `responsible_users` - Blame list for the build, empty if unknown
    ///
    /// # Returns
    /// A payload with an empty `channel`. Its `text` is empty when the event
    /// lacks a builder name or state string.
    pub fn compose(&self, event: &BuildEvent, responsible_users: &[String]) -> MessagePayload {
        let color = color_for(event.result).to_string();

        if !event.is_well_formed() {
            debug!(
                "Build {} is missing its builder name or state string, nothing to render",
                event.build_id
            );
            return MessagePayload {
                color,
                ..Default::default()
            };
        }

        let mut payload = MessagePayload {
            channel: String::new(),
            text: headline(event),
            fallback: format!("{} - {}", event.state_string, event.url),
            color,
            fields: None,
        };

        if event.kind == EventKind::Started {
            return payload;
        }

        payload.fields = Some(self.fields(event, responsible_users));
        payload
    }

    /// Tag, custom properties, worker and responsible users, in display order
    fn fields(&self, event: &BuildEvent, responsible_users: &[String]) -> Vec<Field> {
        if event.properties.is_none() {
            warn!(
                "Build {} of {} arrived without properties, property fields omitted",
                event.build_number, event.builder_name
            );
        }

        let property = |name: &str| {
            properties::get(event.properties.as_ref(), name)
                .ok()
                .flatten()
        };

        let mut fields = Vec::new();

        if let Some(tag) = property(COMMIT_DESCRIPTION_PROPERTY) {
            fields.push(Field::short("Tag", tag));
        }

        for name in self.config.custom_properties_for(&event.builder_name) {
            match property(name.as_str()) {
                Some(value) => fields.push(Field::short(name.clone(), value)),
                None => debug!("Custom property {} not set on build {}", name, event.build_id),
            }
        }

        if let Some(worker) = property(WORKER_NAME_PROPERTY) {
            fields.push(Field::short("Worker", worker));
        }

        if !responsible_users.is_empty() {
            fields.push(Field::short("Responsible Users", responsible_users.join(", ")));
        }

        fields
    }
}

/// `<url|builder # number - state>`, or the bare label when there is no URL
fn headline(event: &BuildEvent) -> String {
    let label = escape(&format!(
        "{} # {} - {}",
        event.builder_name, event.build_number, event.state_string
    ));

    if event.url.is_empty() {
        label
    } else {
        format!("<{}|{}>", event.url, label)
    }
}

// Control characters of the chat markup
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_client::SecretRef;
    use beacon_core::domain::build::{Properties, PropertyValue};

    fn composer() -> MessageComposer {
        MessageComposer::new(Arc::new(Config::new(SecretRef::parse("t"))))
    }

    fn composer_with_custom(builder: &str, names: &[&str]) -> MessageComposer {
        let mut config = Config::new(SecretRef::parse("t"));
        config.builder_custom_message_property.insert(
            builder.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        MessageComposer::new(Arc::new(config))
    }

    fn props(entries: &[(&str, &str)]) -> Properties {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::new(*v, "test")))
            .collect()
    }

    fn event(kind: EventKind, properties: Option<Properties>) -> BuildEvent {
        BuildEvent {
            builder_name: "build-1".to_string(),
            build_number: 42,
            build_id: 7,
            url: "http://ci/1".to_string(),
            state_string: "build successful".to_string(),
            result: BuildResult::Success,
            properties,
            kind,
        }
    }

    fn titles(payload: &MessagePayload) -> Vec<&str> {
        payload
            .fields
            .as_ref()
            .unwrap()
            .iter()
            .map(|f| f.title.as_str())
            .collect()
    }

    #[test]
    fn test_color_table() {
        assert_eq!(color_for(BuildResult::Success), "#8d4");
        assert_eq!(color_for(BuildResult::Warnings), "warning");
        assert_eq!(color_for(BuildResult::Failure), "#ff0000");
        assert_eq!(color_for(BuildResult::Skipped), "#AADDEE");
        assert_eq!(color_for(BuildResult::Exception), "#c6c");
        assert_eq!(color_for(BuildResult::Retry), "#ecc");
        assert_eq!(color_for(BuildResult::Cancelled), "#ecc");
    }

    #[test]
    fn test_unlisted_results_get_neutral_color() {
        let composer = composer();
        for result in [BuildResult::NotFinished, BuildResult::Unknown] {
            let mut e = event(EventKind::Finished, None);
            e.result = result;
            assert_eq!(composer.compose(&e, &[]).color, NEUTRAL_COLOR);
        }
    }

    #[test]
    fn test_text_and_fallback() {
        let payload = composer().compose(&event(EventKind::Finished, Some(props(&[]))), &[]);
        assert_eq!(payload.text, "<http://ci/1|build-1 # 42 - build successful>");
        assert_eq!(payload.fallback, "build successful - http://ci/1");
        assert!(payload.channel.is_empty());
    }

    #[test]
    fn test_text_escapes_markup() {
        let mut e = event(EventKind::Started, None);
        e.state_string = "failed <compile> & test".to_string();
        let payload = composer().compose(&e, &[]);
        assert!(payload.text.contains("failed &lt;compile&gt; &amp; test"));
    }

    #[test]
    fn test_started_event_has_no_fields() {
        let properties = props(&[("commit-description", "v1.2"), ("workername", "w1")]);
        let payload = composer().compose(
            &event(EventKind::Started, Some(properties)),
            &["alice".to_string()],
        );
        assert!(payload.fields.is_none());
        assert_eq!(payload.color, "#8d4");
        assert!(payload.has_text());
    }

    #[test]
    fn test_finished_field_order() {
        let properties = props(&[
            ("commit-description", "v1.2"),
            ("workername", "linux-01"),
            ("version", "1.2.0"),
            ("branch", "main"),
        ]);
        let composer = composer_with_custom("build-1", &["version", "missing", "branch"]);
        let users = vec!["alice".to_string(), "bob".to_string()];

        let payload = composer.compose(&event(EventKind::Finished, Some(properties)), &users);

        assert_eq!(
            titles(&payload),
            vec!["Tag", "version", "branch", "Worker", "Responsible Users"]
        );
        let fields = payload.fields.unwrap();
        assert_eq!(fields[1].value, "1.2.0");
        assert_eq!(fields[3].value, "linux-01");
        assert_eq!(fields[4].value, "alice, bob");
        assert!(fields.iter().all(|f| f.short));
    }

    #[test]
    fn test_missing_tag_does_not_affect_other_fields() {
        let properties = props(&[("workername", "linux-01")]);
        let payload = composer().compose(
            &event(EventKind::Finished, Some(properties)),
            &["alice".to_string()],
        );
        assert_eq!(titles(&payload), vec!["Worker", "Responsible Users"]);
    }

    #[test]
    fn test_custom_properties_only_for_configured_builder() {
        let properties = props(&[("version", "1.2.0")]);
        let composer = composer_with_custom("other-builder", &["version"]);
        let payload = composer.compose(&event(EventKind::Finished, Some(properties)), &[]);
        assert!(payload.fields.unwrap().is_empty());
    }

    #[test]
    fn test_finished_without_properties_keeps_blame() {
        let payload = composer_with_custom("build-1", &["version"])
            .compose(&event(EventKind::Finished, None), &["carol".to_string()]);
        assert_eq!(titles(&payload), vec!["Responsible Users"]);
    }

    #[test]
    fn test_malformed_event_has_no_text() {
        let mut e = event(EventKind::Finished, Some(props(&[("commit-description", "v1")])));
        e.state_string = String::new();
        let payload = composer().compose(&e, &[]);
        assert!(!payload.has_text());
        assert!(payload.fields.is_none());
        assert_eq!(payload.color, "#8d4");
    }

    #[test]
    fn test_event_without_url_uses_plain_label() {
        let mut e = event(EventKind::Started, None);
        e.url = String::new();
        let payload = composer().compose(&e, &[]);
        assert_eq!(payload.text, "build-1 # 42 - build successful");
    }
}
