//! Session login flag.
//!
//! The flag is exactly that: a local boolean, not a verified credential.
//! It rides a replay channel so guards and navigation components always
//! know the current state the moment they subscribe, and it persists a
//! placeholder token through the storage seam so a restart within the
//! same storage lifetime stays "logged in".

use std::sync::Arc;

use statecast_core::{Channel, ChannelReader};

use crate::storage::{KeyValueStore, SESSION_TOKEN_KEY};

/// Placeholder token written on login. Its only meaning is presence.
const PLACEHOLDER_TOKEN: &str = "fake-session-token";

/// Local login state, broadcast with last-value replay.
#[derive(Clone)]
pub struct Session {
    logged_in: Channel<bool>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session backed by the given storage.
    ///
    /// The initial flag is seeded from whether a token is already present
    /// under [`SESSION_TOKEN_KEY`].
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let initial = storage.get(SESSION_TOKEN_KEY).is_some();
        Self {
            logged_in: Channel::replay_seeded(initial).with_name("session.logged_in"),
            storage,
        }
    }

    /// Read side of the login flag; subscribers immediately receive the
    /// current state.
    #[must_use]
    pub fn watch(&self) -> ChannelReader<bool> {
        self.logged_in.reader()
    }

    /// Current login state.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.current_value().unwrap_or(false)
    }

    /// Flags the session as logged in and stores the placeholder token.
    pub fn login(&self) {
        self.storage.set(SESSION_TOKEN_KEY, PLACEHOLDER_TOKEN);
        tracing::debug!("session logged in");
        self.logged_in.emit(true);
    }

    /// Clears the flag and removes the stored token.
    pub fn logout(&self) {
        self.storage.remove(SESSION_TOKEN_KEY);
        tracing::debug!("session logged out");
        self.logged_in.emit(false);
    }
}
