//! Domain types for the todo list.
//!
//! Snapshots are immutable-by-replacement: a mutation never edits an item
//! in place, it produces a whole new sequence and publishes that. A
//! listener therefore always holds a complete, consistent view of the
//! list at one point in logical time.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for a todo item.
///
/// Ids are allocated from a per-store monotonic counter and never reused,
/// so an id observed in one snapshot refers to the same logical item in
/// every later snapshot that still contains it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Title of the todo
    pub title: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not-yet-completed todo item.
    #[must_use]
    pub const fn new(id: TodoId, title: String) -> Self {
        Self {
            id,
            title,
            completed: false,
        }
    }

    /// A copy of this item with the completion flag inverted.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            id: self.id,
            title: self.title.clone(),
            completed: !self.completed,
        }
    }
}

/// One complete, immutable view of the todo list.
///
/// Cloning a snapshot is a reference-count bump; the underlying sequence
/// is shared between the store, the replay channel, and every listener
/// that kept a copy.
pub type TodoSnapshot = Arc<[TodoItem]>;

/// Builds a snapshot from an owned sequence.
#[must_use]
pub fn snapshot_from(items: Vec<TodoItem>) -> TodoSnapshot {
    Arc::from(items)
}

/// An ephemeral event describing a completed list transition.
///
/// Notifications travel on a plain (non-replay) channel: they are never
/// retained and a listener that registers late simply misses them. The
/// `Display` form is the human-readable message a host would surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// An item was appended to the list.
    Added {
        /// Id of the new item
        id: TodoId,
        /// Title of the new item
        title: String,
    },
    /// An item was removed from the list.
    Removed {
        /// Id of the removed item
        id: TodoId,
    },
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added { title, .. } => write!(f, "Todo \"{title}\" was added"),
            Self::Removed { id } => write!(f, "Todo with ID {id} was deleted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_id_display() {
        assert_eq!(TodoId::new(17).to_string(), "17");
    }

    #[test]
    fn todo_item_new_starts_incomplete() {
        let item = TodoItem::new(TodoId::new(1), "Buy milk".to_string());
        assert_eq!(item.title, "Buy milk");
        assert!(!item.completed);
    }

    #[test]
    fn toggled_inverts_only_the_flag() {
        let item = TodoItem::new(TodoId::new(1), "Buy milk".to_string());
        let toggled = item.toggled();

        assert!(toggled.completed);
        assert_eq!(toggled.id, item.id);
        assert_eq!(toggled.title, item.title);
        assert!(!toggled.toggled().completed);
    }

    #[test]
    fn notification_messages() {
        let added = Notification::Added {
            id: TodoId::new(1),
            title: "Buy milk".to_string(),
        };
        assert_eq!(added.to_string(), "Todo \"Buy milk\" was added");

        let removed = Notification::Removed { id: TodoId::new(1) };
        assert_eq!(removed.to_string(), "Todo with ID 1 was deleted");
    }

    #[test]
    fn snapshots_share_storage_on_clone() {
        let snapshot = snapshot_from(vec![TodoItem::new(TodoId::new(1), "One".to_string())]);
        let copy = snapshot.clone();
        assert!(Arc::ptr_eq(&snapshot, &copy));
    }
}
