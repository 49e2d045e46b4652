use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::queue::Queue;

/// Drains a previous/legacy queue instance into the current one, one message
/// per invocation, for zero-downtime migration between queue backends.
///
/// Disabled until an operator explicitly enables it. Messages are pushed
/// unchanged; removal from the previous queue goes through its own ack
/// semantics.
pub struct QueueShovel {
    previous: Arc<dyn Queue>,
    current: Arc<dyn Queue>,
    enabled: AtomicBool,
}

impl QueueShovel {
    pub fn new(previous: Arc<dyn Queue>, current: Arc<dyn Queue>) -> Self {
        Self {
            previous,
            current,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        let was_enabled = self.enabled.swap(enabled, Ordering::SeqCst);
        if was_enabled != enabled {
            info!(enabled, "queue shovel toggled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Migrate at most one message from the previous queue.
    pub fn migrate_one(&self) {
        if !self.is_enabled() {
            trace!("shovel disabled, skipping migration");
            return;
        }
        self.previous.poll(&mut |message, ack| {
            debug!(
                kind = ?message.kind(),
                execution_id = %message.execution_id(),
                "migrating message from previous queue"
            );
            self.current.push(message);
            ack();
        });
    }
}
