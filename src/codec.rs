// Slot serialization: the whole list as one JSON array

use crate::models::TodoItem;
use eyre::{Context, Result};

/// Serialize the list in order
pub fn encode(items: &[TodoItem]) -> Result<String> {
    serde_json::to_string(items).context("Failed to serialize todo list")
}

/// Parse a slot's contents back into a list
///
/// A JSON `null` is treated as an empty list. Duplicate ids are kept as
/// stored; `TodoStore::open` renumbers them.
pub fn decode(contents: &str) -> Result<Vec<TodoItem>> {
    let items: Option<Vec<TodoItem>> = serde_json::from_str(contents).context("Failed to parse todo list")?;
    Ok(items.unwrap_or_default())
}
