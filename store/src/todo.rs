//! The todo store: single source of truth for the todo list.
//!
//! The store is the sole writer of [`TodoSnapshot`] values. Every
//! mutation reads the current snapshot, computes a replacement, and
//! publishes the replacement on a replay channel, all under one lock, so
//! mutations are strictly sequential and no listener ever observes a
//! partial sequence. Additions and removals also emit an ephemeral
//! [`Notification`] on a plain channel.

use std::sync::{Mutex, MutexGuard, PoisonError};

use statecast_core::{Channel, ChannelReader};

use crate::policy::{TitleError, TitlePolicy};
use crate::types::{Notification, TodoId, TodoItem, TodoSnapshot, snapshot_from};

struct TodoInner {
    snapshot: TodoSnapshot,
    next_id: u64,
}

/// Owner of the todo list state.
///
/// One instance per application run; hand components a reference (or the
/// [`ChannelReader`]s it exposes) rather than constructing their own.
///
/// # Concurrency
///
/// Mutations serialize behind an internal lock that spans
/// read-compute-publish, so each mutation is fully applied and published
/// before the next is accepted. Because listeners run inside that window,
/// a listener must not call [`add`](Self::add), [`toggle`](Self::toggle)
/// or [`remove`](Self::remove) from within its callback.
///
/// # Example
///
/// ```
/// use statecast_store::TodoStore;
///
/// let store = TodoStore::new();
/// let id = store.add("Buy milk")?;
///
/// assert!(store.toggle(id));
/// assert!(store.remove(id));
/// assert!(store.snapshot().is_empty());
/// # Ok::<(), statecast_store::TitleError>(())
/// ```
#[derive(Debug)]
pub struct TodoStore {
    inner: Mutex<TodoInner>,
    list: Channel<TodoSnapshot>,
    notifications: Channel<Notification>,
    policy: TitlePolicy,
}

impl std::fmt::Debug for TodoInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoInner")
            .field("items", &self.snapshot.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl TodoStore {
    /// Creates an empty store with the default [`TitlePolicy`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(TitlePolicy::default())
    }

    /// Creates an empty store with a caller-supplied title policy.
    #[must_use]
    pub fn with_policy(policy: TitlePolicy) -> Self {
        let empty = snapshot_from(Vec::new());
        Self {
            inner: Mutex::new(TodoInner {
                snapshot: empty.clone(),
                next_id: 1,
            }),
            list: Channel::replay_seeded(empty).with_name("todo.list"),
            notifications: Channel::plain().with_name("todo.notifications"),
            policy,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TodoInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read side of the list channel.
    ///
    /// A replay channel: subscribers immediately receive the current
    /// snapshot, then every future snapshot.
    #[must_use]
    pub fn list(&self) -> ChannelReader<TodoSnapshot> {
        self.list.reader()
    }

    /// Read side of the notification channel.
    ///
    /// A plain channel: events are not retained, so listeners registered
    /// after a transition never see it.
    #[must_use]
    pub fn notifications(&self) -> ChannelReader<Notification> {
        self.notifications.reader()
    }

    /// The current snapshot, without subscribing.
    #[must_use]
    pub fn snapshot(&self) -> TodoSnapshot {
        self.lock().snapshot.clone()
    }

    /// Number of items in the current snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().snapshot.len()
    }

    /// Whether the list is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The title policy this store validates against.
    #[must_use]
    pub const fn policy(&self) -> &TitlePolicy {
        &self.policy
    }

    /// Appends a new, not-yet-completed item and returns its id.
    ///
    /// The title is validated (trimmed) against the store's policy before
    /// an id is allocated, so rejected calls consume nothing. On success
    /// the new snapshot is published, then a [`Notification::Added`] is
    /// emitted.
    ///
    /// # Errors
    ///
    /// Returns a [`TitleError`] when the title fails validation; the list
    /// is unchanged and no notification is emitted.
    pub fn add(&self, title: &str) -> Result<TodoId, TitleError> {
        let mut inner = self.lock();

        let title = self.policy.validate(title)?;
        let id = TodoId::new(inner.next_id);
        inner.next_id += 1;

        let mut items = inner.snapshot.to_vec();
        items.push(TodoItem::new(id, title.to_string()));
        let snapshot = snapshot_from(items);
        inner.snapshot = snapshot.clone();

        tracing::debug!(%id, title, "todo added");
        self.list.emit(snapshot);
        self.notifications.emit(Notification::Added {
            id,
            title: title.to_string(),
        });

        Ok(id)
    }

    /// Inverts the completion flag of the item with the given id.
    ///
    /// Publishes a new snapshot in which every other item is structurally
    /// unchanged. An unknown id is a benign no-op returning `false`
    /// (delete races from doubled-up UI gestures are expected), with no
    /// snapshot published and no notification emitted.
    pub fn toggle(&self, id: TodoId) -> bool {
        let mut inner = self.lock();

        let Some(index) = inner.snapshot.iter().position(|item| item.id == id) else {
            tracing::debug!(%id, "toggle ignored, no such todo");
            return false;
        };

        let mut items = inner.snapshot.to_vec();
        if let Some(item) = items.get_mut(index) {
            *item = item.toggled();
        }
        let snapshot = snapshot_from(items);
        inner.snapshot = snapshot.clone();

        tracing::debug!(%id, "todo toggled");
        self.list.emit(snapshot);
        true
    }

    /// Removes the item with the given id.
    ///
    /// Publishes a snapshot excluding the item, then emits
    /// [`Notification::Removed`]. An unknown id is a benign no-op
    /// returning `false`, with no snapshot published and no notification
    /// emitted.
    pub fn remove(&self, id: TodoId) -> bool {
        let mut inner = self.lock();

        if !inner.snapshot.iter().any(|item| item.id == id) {
            tracing::debug!(%id, "remove ignored, no such todo");
            return false;
        }

        let items: Vec<TodoItem> = inner
            .snapshot
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        let snapshot = snapshot_from(items);
        inner.snapshot = snapshot.clone();

        tracing::debug!(%id, "todo removed");
        self.list.emit(snapshot);
        self.notifications.emit(Notification::Removed { id });

        true
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}
