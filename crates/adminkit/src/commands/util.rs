//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};

use serde_json::{Map, Value};

use adminkit_core::{ItemId, Record};

use super::Screen;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses to guess when stdin is not a terminal.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a `--json` argument that must be a JSON object.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(CliError::Validation {
            field: "json".into(),
            reason: format!("expected a JSON object, got {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Dedupe raw ids, keeping first occurrences in order.
pub fn unique_ids(raw: Vec<String>) -> Vec<ItemId> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .map(ItemId::from)
        .collect()
}

/// Fail with `NotFound` for the first id the loaded screen does not know.
pub fn require_known(screen: &Screen, ids: &[ItemId]) -> Result<(), CliError> {
    let state = screen.snapshot();
    match ids.iter().find(|id| !state.tree.contains(id)) {
        Some(missing) => Err(CliError::NotFound {
            item_type: screen.config().item_type.clone(),
            identifier: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Display name of `id` on the loaded screen, falling back to the id.
pub fn name_of(screen: &Screen, id: &ItemId) -> String {
    screen
        .snapshot()
        .find(id)
        .map_or_else(|| id.to_string(), Record::display_name)
}
