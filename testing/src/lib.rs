//! # Statecast Testing
//!
//! Testing utilities and helpers for the Statecast toolkit.
//!
//! This crate provides:
//! - [`Probe`]: a listener that records every value it receives
//! - [`RecordingReporter`]: an [`ErrorReporter`] that captures faults
//! - [`TodoModel`]: an independent reference model of the todo store,
//!   for model-based equivalence tests
//!
//! ## Example
//!
//! ```
//! use statecast_store::TodoStore;
//! use statecast_testing::Probe;
//!
//! let store = TodoStore::new();
//! let probe = Probe::new();
//! let _sub = probe.attach(&store.list());
//!
//! // The replay channel delivered the current (empty) snapshot.
//! assert_eq!(probe.len(), 1);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use statecast_core::{ChannelReader, ErrorReporter, FaultContext, ListenerFault, ListenerId,
    Subscription};
use statecast_store::{TitleError, TitlePolicy, TodoId, TodoItem};

/// Capturing doubles for the core collaborator seams.
pub mod mocks {
    use super::{Arc, ErrorReporter, FaultContext, ListenerFault, ListenerId, Mutex, PoisonError};

    /// One captured listener fault.
    #[derive(Debug, Clone)]
    pub struct RecordedFault {
        /// The fault message.
        pub message: String,
        /// Name of the channel the fault happened on.
        pub channel: String,
        /// The faulting listener.
        pub listener: ListenerId,
    }

    /// An [`ErrorReporter`] that records every fault it is handed.
    ///
    /// Clones share the same capture buffer, so keep one handle in the
    /// test while the channel owns another.
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        faults: Arc<Mutex<Vec<RecordedFault>>>,
    }

    impl Clone for RecordingReporter {
        fn clone(&self) -> Self {
            Self {
                faults: Arc::clone(&self.faults),
            }
        }
    }

    impl RecordingReporter {
        /// Creates an empty reporter.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// The faults recorded so far, in report order.
        #[must_use]
        pub fn faults(&self) -> Vec<RecordedFault> {
            self.faults
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of faults recorded so far.
        #[must_use]
        pub fn len(&self) -> usize {
            self.faults
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether no fault has been recorded.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, fault: &ListenerFault, context: &FaultContext) {
            self.faults
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedFault {
                    message: fault.message().to_string(),
                    channel: context.channel.to_string(),
                    listener: context.listener,
                });
        }
    }
}

/// Value-recording listeners.
pub mod probes {
    use super::{Arc, ChannelReader, Mutex, PoisonError, Subscription};

    /// A listener that records every value it receives.
    ///
    /// Clones share the same buffer: hand [`listener`](Probe::listener)
    /// to a channel and keep the probe to inspect what arrived.
    #[derive(Debug)]
    pub struct Probe<T> {
        received: Arc<Mutex<Vec<T>>>,
    }

    impl<T> Clone for Probe<T> {
        fn clone(&self) -> Self {
            Self {
                received: Arc::clone(&self.received),
            }
        }
    }

    impl<T> Default for Probe<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T> Probe<T> {
        /// Creates a probe with an empty buffer.
        #[must_use]
        pub fn new() -> Self {
            Self {
                received: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Number of values received so far.
        #[must_use]
        pub fn len(&self) -> usize {
            self.received
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing has been received yet.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl<T: Clone + Send + 'static> Probe<T> {
        /// A listener closure that records into this probe's buffer.
        #[must_use]
        pub fn listener(&self) -> impl Fn(&T) + Send + Sync + 'static + use<T> {
            let sink = Arc::clone(&self.received);
            move |value: &T| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(value.clone());
            }
        }

        /// Subscribes this probe's listener to a channel.
        #[must_use = "dropping the subscription immediately unsubscribes the probe"]
        pub fn attach(&self, reader: &ChannelReader<T>) -> Subscription {
            reader.subscribe(self.listener())
        }

        /// The values received so far, in delivery order.
        #[must_use]
        pub fn received(&self) -> Vec<T> {
            self.received
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// The most recently received value, if any.
        #[must_use]
        pub fn last(&self) -> Option<T> {
            self.received
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }
    }
}

/// Reference models for model-based testing.
pub mod model {
    use super::{TitleError, TitlePolicy, TodoId, TodoItem};

    /// An independent, deliberately simple model of the todo store.
    ///
    /// Implements the same observable semantics (trimmed validation
    /// against a policy, monotonic ids allocated only on accepted adds,
    /// soft no-ops for unknown ids) over a plain `Vec`, with no channels
    /// involved. Model-based tests drive the real store and this model
    /// with the same operation sequence and compare results.
    #[derive(Debug, Clone)]
    pub struct TodoModel {
        items: Vec<TodoItem>,
        next_id: u64,
        policy: TitlePolicy,
    }

    impl TodoModel {
        /// Creates an empty model with the default policy.
        #[must_use]
        pub fn new() -> Self {
            Self::with_policy(TitlePolicy::default())
        }

        /// Creates an empty model with the given policy.
        #[must_use]
        pub const fn with_policy(policy: TitlePolicy) -> Self {
            Self {
                items: Vec::new(),
                next_id: 1,
                policy,
            }
        }

        /// Appends an item.
        ///
        /// # Errors
        ///
        /// Returns a [`TitleError`] when the title fails validation.
        pub fn add(&mut self, title: &str) -> Result<TodoId, TitleError> {
            let title = self.policy.validate(title)?;
            let id = TodoId::new(self.next_id);
            self.next_id += 1;
            self.items.push(TodoItem::new(id, title.to_string()));
            Ok(id)
        }

        /// Inverts the completion flag; `false` for an unknown id.
        pub fn toggle(&mut self, id: TodoId) -> bool {
            match self.items.iter_mut().find(|item| item.id == id) {
                Some(item) => {
                    item.completed = !item.completed;
                    true
                }
                None => false,
            }
        }

        /// Removes the item; `false` for an unknown id.
        pub fn remove(&mut self, id: TodoId) -> bool {
            let before = self.items.len();
            self.items.retain(|item| item.id != id);
            self.items.len() < before
        }

        /// The model's current items.
        #[must_use]
        pub fn items(&self) -> &[TodoItem] {
            &self.items
        }
    }

    impl Default for TodoModel {
        fn default() -> Self {
            Self::new()
        }
    }
}

// Re-export commonly used items
pub use mocks::{RecordedFault, RecordingReporter};
pub use model::TodoModel;
pub use probes::Probe;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use statecast_core::Channel;

    #[test]
    fn probe_records_in_delivery_order() {
        let channel: Channel<u32> = Channel::plain();
        let probe = Probe::new();
        let _sub = probe.attach(&channel.reader());

        channel.emit(1);
        channel.emit(2);

        assert_eq!(probe.received(), vec![1, 2]);
        assert_eq!(probe.last(), Some(2));
    }

    #[test]
    fn model_mirrors_basic_store_semantics() {
        let mut model = TodoModel::new();
        assert!(model.add("").is_err());

        let id = model.add("Buy milk").unwrap();
        assert_eq!(id, TodoId::new(1));
        assert!(model.toggle(id));
        assert!(model.items()[0].completed);
        assert!(model.remove(id));
        assert!(!model.remove(id));
        assert!(model.items().is_empty());
    }
}
