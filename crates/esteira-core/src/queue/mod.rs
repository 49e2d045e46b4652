use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::message::Message;

mod memory;
mod metrics;

pub use memory::InMemoryQueue;
pub use metrics::Metrics;

/// Acknowledgment capability bound to one specific delivery attempt.
/// Invoking it permanently removes the delivered entry from the queue. An
/// ack issued for a superseded delivery (the entry was redelivered or
/// dead-lettered in the meantime) is a logged no-op.
pub type Ack = Box<dyn FnOnce() + Send>;

/// Invoked exactly once per message that exhausts its redelivery budget.
/// Failures inside the callback are not the queue's to recover; panics
/// propagate to the caller of [`Queue::retry`].
pub type DeadMessageCallback = Arc<dyn Fn(&dyn Queue, &Message) + Send + Sync>;

/// The durable delay queue contract consumed by `QueueProcessor`, producer
/// code in the execution runner, and `QueueShovel`.
pub trait Queue: Send + Sync {
    /// Push for immediate delivery. Never fails for well-formed messages.
    fn push(&self, message: Message) {
        self.push_delayed(message, Duration::ZERO);
    }

    /// Push scheduled for delivery at `now + delay`. A push whose
    /// fingerprint matches an unacknowledged entry is dropped.
    fn push_delayed(&self, message: Message, delay: Duration);

    /// Single non-blocking delivery attempt. Invokes `callback` with the
    /// earliest-ready message and its ack capability, or returns without
    /// invoking it when nothing is ready.
    fn poll(&self, callback: &mut dyn FnMut(Message, Ack));

    /// Redelivery sweep: expired in-flight entries are made redeliverable,
    /// or removed and dead-lettered once their attempt budget is exhausted.
    fn retry(&self);

    /// The visibility deadline applied to each delivery.
    fn ack_timeout(&self) -> Duration;
}

/// Queue tuning knobs, deserializable from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// How long a delivered message stays invisible before the sweep may
    /// redeliver it, in milliseconds.
    pub ack_timeout_ms: u64,
    /// Redelivery attempts granted before dead-lettering. A message-level
    /// `MaxAttemptsAttribute` overrides this per message.
    pub max_retries: u32,
}

impl QueueConfig {
    pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: Self::DEFAULT_ACK_TIMEOUT_MS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }
}


#[cfg(test)]
mod tests;
