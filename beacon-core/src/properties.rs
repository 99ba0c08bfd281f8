//! Typed access to build properties
//!
//! Property values arrive as loosely-typed JSON paired with their source.
//! These helpers discard the source and hand back plain strings.

use crate::domain::build::Properties;
use crate::error::InvalidInputError;

/// Looks up a property and renders its value as a string
///
/// Returns `Ok(None)` when the property is not set. Fails only when the
/// properties container itself is missing, which means the caller never
/// received property data from the orchestrator.
pub fn get(properties: Option<&Properties>, name: &str) -> Result<Option<String>, InvalidInputError> {
    let properties = properties.ok_or_else(|| {
        InvalidInputError(format!("no properties available to look up '{}'", name))
    })?;

    Ok(properties.get(name).map(|property| render(property.value())))
}

fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
