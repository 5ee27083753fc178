//! Cross-component message hub.
//!
//! Components that are not directly related share state through this hub
//! instead of reaching into each other: any component may publish, any
//! component may subscribe. The hub rides a replay channel, so a
//! component activated late still sees the current message immediately.

use statecast_core::{Channel, ChannelReader};

/// Initial shared message before anything has been published.
pub const DEFAULT_MESSAGE: &str = "Initial shared message";

/// Shared mutable message, broadcast to all interested components.
#[derive(Debug, Clone)]
pub struct MessageHub {
    messages: Channel<String>,
}

impl MessageHub {
    /// Creates a hub seeded with [`DEFAULT_MESSAGE`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial(DEFAULT_MESSAGE)
    }

    /// Creates a hub seeded with a caller-supplied message.
    #[must_use]
    pub fn with_initial(message: impl Into<String>) -> Self {
        Self {
            messages: Channel::replay_seeded(message.into()).with_name("messaging.current"),
        }
    }

    /// Read side of the message channel.
    #[must_use]
    pub fn messages(&self) -> ChannelReader<String> {
        self.messages.reader()
    }

    /// The message currently shared.
    #[must_use]
    pub fn current(&self) -> String {
        self.messages.current_value().unwrap_or_default()
    }

    /// Publishes a new shared message to everyone listening.
    pub fn send(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "shared message updated");
        self.messages.emit(message);
    }
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new()
    }
}
