//! # Statecast Store
//!
//! Domain services built on the [`statecast_core`] broadcast channel.
//!
//! The centerpiece is the [`TodoStore`], the single source of truth for
//! the todo list: it publishes complete immutable snapshots on a replay
//! channel and ephemeral [`Notification`] events on a plain channel. The
//! same primitive, unchanged, also carries the [`MessageHub`] shared
//! message, the [`Scoreboard`] demo, and the [`Session`] login flag.
//!
//! ## Ownership
//!
//! Every service here is an explicitly constructed, explicitly owned
//! object with a single-instance-per-application-run lifecycle. Wire them
//! at startup and pass references (or the [`ChannelReader`]s they expose)
//! to the components that need them; nothing in this crate is ambient
//! global state.
//!
//! [`ChannelReader`]: statecast_core::ChannelReader
//!
//! ## Example
//!
//! ```
//! use statecast_store::TodoStore;
//!
//! let store = TodoStore::new();
//! let list = store.list();
//!
//! let sub = list.subscribe(|snapshot| {
//!     let _ = snapshot.len();
//! });
//!
//! let id = store.add("Buy milk")?;
//! store.toggle(id);
//! sub.unsubscribe();
//! # Ok::<(), statecast_store::TitleError>(())
//! ```

/// Cross-component message hub.
pub mod messaging;

/// Title validation policy and errors.
pub mod policy;

/// Scoreboard demo service.
pub mod scoreboard;

/// Session login flag.
pub mod session;

/// Key-value storage seam.
pub mod storage;

/// The todo store.
pub mod todo;

/// Todo domain types.
pub mod types;

pub use messaging::{DEFAULT_MESSAGE, MessageHub};
pub use policy::{DEFAULT_MAX_TITLE_LEN, DEFAULT_MIN_TITLE_LEN, TitleError, TitlePolicy};
pub use scoreboard::Scoreboard;
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore, SESSION_TOKEN_KEY};
pub use todo::TodoStore;
pub use types::{Notification, TodoId, TodoItem, TodoSnapshot, snapshot_from};
