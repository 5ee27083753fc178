//! The broadcast channel primitive.
//!
//! A [`Channel`] decouples producers of state changes from consumers. One
//! implementation covers both delivery modes behind a single retention
//! flag chosen at construction:
//!
//! - **Plain**: emitted values reach only the listeners registered at the
//!   time of the call. Late subscribers miss earlier emissions.
//! - **Replay**: the channel retains the last emitted value (or a seed
//!   value) and delivers it synchronously to every new subscriber before
//!   [`subscribe`](Channel::subscribe) returns.
//!
//! Emission is synchronous: every listener runs on the caller's thread
//! before [`emit`](Channel::emit) returns. Iteration walks a stable
//! snapshot of the listener set taken at the start of the call, so
//! listeners may subscribe, unsubscribe, or emit again from inside their
//! own callback without corrupting the iteration. Ordering guarantees are
//! stated for the single-threaded cooperative host this primitive is
//! designed for; the registry is nevertheless lock-protected so a
//! multi-threaded host stays memory-safe.

use smallvec::SmallVec;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::reporter::{ErrorReporter, FaultContext, ListenerFault, TracingReporter};

/// Identity of a registered listener within its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type ListenerFn<T> = dyn Fn(&T) + Send + Sync;

struct ListenerEntry<T> {
    id: ListenerId,
    callback: Arc<ListenerFn<T>>,
}

/// Listener set and retained value, shared between channel handles and
/// outstanding subscriptions. Insertion order is notification order.
struct Registry<T> {
    listeners: Vec<ListenerEntry<T>>,
    retained: Option<T>,
}

/// Locks a registry, recovering from poisoning.
///
/// Listener callbacks run outside the lock, so a panicking listener cannot
/// poison it; recovery here covers a host thread dying mid-operation.
fn lock_registry<T>(registry: &Mutex<Registry<T>>) -> MutexGuard<'_, Registry<T>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A publish/subscribe broadcast channel.
///
/// `Channel` is a cheap-to-clone handle; clones share the same listener
/// set and retained value. The channel owns its listener set: listeners
/// stay registered until their [`Subscription`] is dropped, explicitly
/// unsubscribed, or detached.
///
/// # Example
///
/// ```
/// use statecast_core::Channel;
///
/// let scores: Channel<u64> = Channel::replay_seeded(0);
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
///
/// let sink = std::sync::Arc::clone(&seen);
/// let sub = scores.subscribe(move |score| {
///     if let Ok(mut values) = sink.lock() {
///         values.push(*score);
///     }
/// });
///
/// scores.emit(3);
/// scores.emit(7);
/// sub.unsubscribe();
///
/// // The seed was replayed on subscribe, then both emissions arrived.
/// assert_eq!(seen.lock().map(|v| v.clone()).unwrap_or_default(), vec![0, 3, 7]);
/// assert_eq!(scores.current_value(), Some(7));
/// ```
pub struct Channel<T> {
    registry: Arc<Mutex<Registry<T>>>,
    retain_last_value: bool,
    name: Arc<str>,
    reporter: Arc<dyn ErrorReporter>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            retain_last_value: self.retain_last_value,
            name: Arc::clone(&self.name),
            reporter: Arc::clone(&self.reporter),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("retain_last_value", &self.retain_last_value)
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl<T> Channel<T> {
    fn with_retention(retain_last_value: bool) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                listeners: Vec::new(),
                retained: None,
            })),
            retain_last_value,
            name: Arc::from("anonymous"),
            reporter: Arc::new(TracingReporter),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Creates a channel that does not retain emitted values.
    ///
    /// Listeners receive only emissions made after they subscribed.
    #[must_use]
    pub fn plain() -> Self {
        Self::with_retention(false)
    }

    /// Creates a channel that retains its last emitted value.
    ///
    /// Until the first emission there is no retained value and new
    /// subscribers receive nothing at subscribe time.
    #[must_use]
    pub fn replay() -> Self {
        Self::with_retention(true)
    }

    /// Creates a replay channel seeded with an initial value.
    ///
    /// Every subscriber receives the current value synchronously upon
    /// subscribing, starting with `initial`.
    #[must_use]
    pub fn replay_seeded(initial: T) -> Self {
        let channel = Self::with_retention(true);
        lock_registry(&channel.registry).retained = Some(initial);
        channel
    }

    /// Names the channel; the name appears in fault reports and traces.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the default fault reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The channel's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this channel replays its last value to new subscribers.
    #[must_use]
    pub const fn retains_last_value(&self) -> bool {
        self.retain_last_value
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.registry).listeners.len()
    }

    /// A read-only handle over this channel.
    ///
    /// Readers can subscribe and inspect the retained value but cannot
    /// emit, which keeps a store's output channels one-directional.
    #[must_use]
    pub fn reader(&self) -> ChannelReader<T> {
        ChannelReader {
            channel: self.clone(),
        }
    }

    /// Invokes one listener, catching and reporting any panic.
    fn invoke(&self, callback: &Arc<ListenerFn<T>>, id: ListenerId, value: &T) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(value))) {
            let fault = ListenerFault::from_panic(payload.as_ref());
            let context = FaultContext {
                channel: Arc::clone(&self.name),
                listener: id,
            };
            self.reporter.report(&fault, &context);
        }
    }
}

impl<T: Clone + Send + 'static> Channel<T> {
    /// Registers a listener and returns its subscription handle.
    ///
    /// The listener is invoked for every future emission, in registration
    /// order relative to other listeners. On a replay channel holding a
    /// retained value, the listener is additionally invoked with that
    /// value, synchronously, before this method returns; that delivery is
    /// subject to the same fault isolation as a regular emission.
    ///
    /// A listener registered from inside another listener's callback does
    /// not see the emission currently in flight.
    #[must_use = "dropping the subscription immediately unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let callback: Arc<ListenerFn<T>> = Arc::new(listener);
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let replayed = {
            let mut registry = lock_registry(&self.registry);
            registry.listeners.push(ListenerEntry {
                id,
                callback: Arc::clone(&callback),
            });
            registry.retained.clone()
        };

        tracing::trace!(channel = %self.name, listener = %id, "listener subscribed");

        if let Some(value) = replayed {
            self.invoke(&callback, id, &value);
        }

        let registry = Arc::downgrade(&self.registry);
        let name = Arc::clone(&self.name);
        Subscription::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let mut registry = lock_registry(&registry);
            let before = registry.listeners.len();
            registry.listeners.retain(|entry| entry.id != id);
            if registry.listeners.len() < before {
                tracing::trace!(channel = %name, listener = %id, "listener unsubscribed");
            }
        })
    }

    /// Broadcasts a value to every listener registered at the start of
    /// the call, in registration order.
    ///
    /// On a replay channel the value becomes the retained value before any
    /// listener runs. Listeners run synchronously on the caller's thread;
    /// a listener that panics is reported through the channel's
    /// [`ErrorReporter`] and the remaining listeners still run. Listeners
    /// may re-enter the channel (emit, subscribe, unsubscribe) freely:
    /// registrations and removals made during the call take effect at the
    /// next emission.
    pub fn emit(&self, value: T) {
        let snapshot: SmallVec<[(ListenerId, Arc<ListenerFn<T>>); 4]> = {
            let mut registry = lock_registry(&self.registry);
            if self.retain_last_value {
                registry.retained = Some(value.clone());
            }
            registry
                .listeners
                .iter()
                .map(|entry| (entry.id, Arc::clone(&entry.callback)))
                .collect()
        };

        tracing::trace!(channel = %self.name, listeners = snapshot.len(), "emit");

        for (id, callback) in &snapshot {
            self.invoke(callback, *id, &value);
        }
    }

    /// The retained value, if any.
    ///
    /// Always `None` for a plain channel, and for a replay channel that
    /// has neither a seed nor a prior emission.
    #[must_use]
    pub fn current_value(&self) -> Option<T> {
        lock_registry(&self.registry).retained.clone()
    }
}

/// Read-only handle over a [`Channel`].
///
/// Exposes subscription and inspection but not emission. Obtained via
/// [`Channel::reader`]; cheap to clone.
pub struct ChannelReader<T> {
    channel: Channel<T>,
}

impl<T> Clone for ChannelReader<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ChannelReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelReader")
            .field("name", &self.channel.name)
            .finish_non_exhaustive()
    }
}

impl<T> ChannelReader<T> {
    /// The underlying channel's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.channel.name()
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.channel.subscriber_count()
    }
}

impl<T: Clone + Send + 'static> ChannelReader<T> {
    /// See [`Channel::subscribe`].
    #[must_use = "dropping the subscription immediately unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.channel.subscribe(listener)
    }

    /// See [`Channel::current_value`].
    #[must_use]
    pub fn current_value(&self) -> Option<T> {
        self.channel.current_value()
    }
}

/// Handle for a registered listener.
///
/// Dropping the handle unsubscribes the listener, so a component that
/// stores its subscriptions alongside its own state is torn down cleanly
/// with it. [`unsubscribe`](Subscription::unsubscribe) removes the
/// listener eagerly and is idempotent; [`detach`](Subscription::detach)
/// keeps the listener registered for the channel's lifetime.
#[must_use = "dropping the subscription immediately unsubscribes the listener"]
pub struct Subscription {
    cancel: Box<dyn Fn() + Send + Sync>,
    detached: bool,
}

impl Subscription {
    fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
            detached: false,
        }
    }

    /// Removes the listener from its channel.
    ///
    /// Calling this more than once is a no-op. A removal made while an
    /// emission is in flight takes effect at the next emission.
    pub fn unsubscribe(&self) {
        (self.cancel)();
    }

    /// Consumes the handle without unsubscribing.
    ///
    /// The listener stays registered for as long as the channel lives.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            (self.cancel)();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
    }

    #[test]
    fn plain_channel_retains_nothing() {
        let channel: Channel<u32> = Channel::plain();
        channel.emit(1);
        assert_eq!(channel.current_value(), None);
    }

    #[test]
    fn plain_channel_skips_late_subscribers() {
        let channel: Channel<u32> = Channel::plain();
        channel.emit(1);

        let (seen, listener) = recorder();
        let _sub = channel.subscribe(listener);

        assert!(seen.lock().unwrap().is_empty());
        channel.emit(2);
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn replay_channel_delivers_retained_value_on_subscribe() {
        let channel: Channel<u32> = Channel::replay();
        channel.emit(5);

        let (seen, listener) = recorder();
        let _sub = channel.subscribe(listener);

        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[test]
    fn empty_replay_channel_delivers_nothing_on_subscribe() {
        let channel: Channel<u32> = Channel::replay();

        let (seen, listener) = recorder();
        let _sub = channel.subscribe(listener);

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(channel.current_value(), None);
    }

    #[test]
    fn seeded_channel_starts_with_initial_value() {
        let channel = Channel::replay_seeded(String::from("hello"));
        assert_eq!(channel.current_value(), Some(String::from("hello")));

        let (seen, listener) = recorder();
        let _sub = channel.subscribe(listener);
        assert_eq!(*seen.lock().unwrap(), vec![String::from("hello")]);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let channel: Channel<u32> = Channel::plain();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = channel.subscribe(move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&order);
        let _b = channel.subscribe(move |_| second.lock().unwrap().push("second"));

        channel.emit(0);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let channel: Channel<u32> = Channel::plain();
        let (seen, listener) = recorder();

        {
            let _sub = channel.subscribe(listener);
            channel.emit(1);
        }
        channel.emit(2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn detach_keeps_listener_registered() {
        let channel: Channel<u32> = Channel::plain();
        let (seen, listener) = recorder();

        channel.subscribe(listener).detach();
        channel.emit(1);
        channel.emit(2);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(channel.subscriber_count(), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let channel: Channel<u32> = Channel::plain();
        let (seen, listener) = recorder();

        let sub = channel.subscribe(listener);
        sub.unsubscribe();
        sub.unsubscribe();
        drop(sub);

        channel.emit(1);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn reader_exposes_subscription_but_not_emission() {
        let channel: Channel<u32> = Channel::replay_seeded(9);
        let reader = channel.reader();

        assert_eq!(reader.current_value(), Some(9));

        let (seen, listener) = recorder();
        let _sub = reader.subscribe(listener);
        channel.emit(10);

        assert_eq!(*seen.lock().unwrap(), vec![9, 10]);
        assert_eq!(reader.subscriber_count(), 1);
    }

    #[test]
    fn clones_share_the_listener_set() {
        let channel: Channel<u32> = Channel::plain();
        let clone = channel.clone();

        let (seen, listener) = recorder();
        let _sub = clone.subscribe(listener);
        channel.emit(7);

        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }
}
