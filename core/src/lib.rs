//! # Statecast Core
//!
//! Broadcast channel primitive for the Statecast toolkit.
//!
//! This crate provides the one mechanism everything else builds on: a
//! synchronous publish/subscribe [`Channel`] with two delivery modes
//! behind a single retention flag.
//!
//! ## Core Concepts
//!
//! - **Channel**: ordered fan-out of emitted values to registered
//!   listeners, invoked synchronously on the emitting thread
//! - **Replay**: a channel variant that retains its last value and hands
//!   it to new subscribers at subscribe time
//! - **Subscription**: a handle whose drop (or explicit, idempotent
//!   `unsubscribe`) removes the listener
//! - **Fault isolation**: a panicking listener is caught, reported to an
//!   injected [`ErrorReporter`], and never blocks the other listeners
//!
//! ## Example
//!
//! ```
//! use statecast_core::Channel;
//!
//! let messages: Channel<String> = Channel::replay_seeded("ready".to_string());
//!
//! // New subscribers immediately observe the retained value.
//! let sub = messages.subscribe(|message| {
//!     let _ = message;
//! });
//!
//! messages.emit("state changed".to_string());
//! assert_eq!(messages.current_value().as_deref(), Some("state changed"));
//! sub.unsubscribe();
//! ```

/// Broadcast channel, subscriptions, and read-only channel handles.
pub mod channel;

/// Listener fault types and the error-reporting seam.
pub mod reporter;

pub use channel::{Channel, ChannelReader, ListenerId, Subscription};
pub use reporter::{ErrorReporter, FaultContext, ListenerFault, TracingReporter};
