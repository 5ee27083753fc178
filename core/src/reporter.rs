//! Fault reporting for listener failures.
//!
//! A listener that panics during an emission must not take the rest of the
//! emission down with it. The channel catches the panic at its boundary,
//! converts it into a [`ListenerFault`], and hands it to the
//! [`ErrorReporter`] wired into the channel at construction. The default
//! reporter logs through `tracing`; hosts with their own alerting surface
//! inject a custom implementation via
//! [`Channel::with_reporter`](crate::channel::Channel::with_reporter).

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

use crate::channel::ListenerId;

/// A failure raised inside a subscriber while it was being notified.
///
/// Faults are caught at the channel boundary, so a misbehaving listener
/// never prevents the remaining listeners from running and never corrupts
/// the channel's own state.
#[derive(Debug, Clone, Error)]
#[error("listener panicked: {message}")]
pub struct ListenerFault {
    message: String,
}

impl ListenerFault {
    /// Builds a fault from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        Self { message }
    }

    /// The panic message carried by the fault.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Where a fault happened: which channel, which listener.
#[derive(Debug, Clone)]
pub struct FaultContext {
    /// Name of the channel the listener was registered on.
    pub channel: Arc<str>,
    /// Identity of the faulting listener.
    pub listener: ListenerId,
}

impl std::fmt::Display for FaultContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel '{}', listener {}", self.channel, self.listener)
    }
}

/// Collaborator that receives listener faults.
///
/// Implementations must not panic; a reporter is the last line of defense
/// during an emission.
pub trait ErrorReporter: Send + Sync {
    /// Called once per faulting listener per emission.
    fn report(&self, fault: &ListenerFault, context: &FaultContext);
}

/// Default reporter: logs faults at `error` level through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, fault: &ListenerFault, context: &FaultContext) {
        tracing::error!(
            channel = %context.channel,
            listener = %context.listener,
            "{fault}"
        );
    }
}
