// Data models for TodoStore

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};

/// A single task in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Creation timestamp in milliseconds, bumped to stay unique
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Hands out strictly increasing ids derived from the wall clock
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Start after the largest id already in use
    pub fn seeded(items: &[TodoItem]) -> Self {
        Self {
            last: items.iter().map(|item| item.id).max().unwrap_or(0),
        }
    }

    pub fn next_id(&mut self) -> Result<i64> {
        self.next_id_at(now_ms())
    }

    /// Two ids issued within the same millisecond still differ
    pub(crate) fn next_id_at(&mut self, now: i64) -> Result<i64> {
        let next = self
            .last
            .checked_add(1)
            .ok_or_else(|| eyre!("No todo ids left after {}", self.last))?;
        let id = now.max(next);
        self.last = id;
        Ok(id)
    }
}

/// Normalize user-entered text, rejecting blank input
pub fn clean_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_ids_increase_within_same_millisecond() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id_at(5000).unwrap();
        let b = ids.next_id_at(5000).unwrap();
        let c = ids.next_id_at(4000).unwrap(); // clock went backwards
        assert_eq!(a, 5000);
        assert_eq!(b, 5001);
        assert_eq!(c, 5002);
    }

    #[test]
    fn test_seeded_generator_skips_existing_ids() {
        let items = vec![TodoItem::new(10, "a"), TodoItem::new(90, "b"), TodoItem::new(40, "c")];
        let mut ids = IdGenerator::seeded(&items);
        assert_eq!(ids.next_id_at(1).unwrap(), 91);
    }

    #[test]
    fn test_exhausted_ids_are_an_error() {
        let mut ids = IdGenerator::seeded(&[TodoItem::new(i64::MAX, "last")]);
        assert!(ids.next_id_at(5000).is_err());
        assert!(ids.next_id().is_err());

        let mut ids = IdGenerator::seeded(&[TodoItem::new(i64::MAX - 1, "almost")]);
        assert_eq!(ids.next_id_at(5000).unwrap(), i64::MAX);
        assert!(ids.next_id_at(5000).is_err());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  buy milk \n"), Some("buy milk"));
        assert_eq!(clean_text(""), None);
        assert_eq!(clean_text("   \t"), None);
    }

    #[test]
    fn test_item_serialization() {
        let item = TodoItem::new(1700000000000, "buy milk");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":1700000000000,"text":"buy milk","completed":false}"#);

        let back: TodoItem = serde_json::from_str(r#"{"id":3,"text":"x"}"#).unwrap();
        assert!(!back.completed);
    }
}
