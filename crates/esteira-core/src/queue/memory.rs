use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::attributes::MaxAttemptsAttribute;
use crate::clock::Clock;
use crate::message::Message;
use crate::queue::{Ack, DeadMessageCallback, Metrics, Queue, QueueConfig};

/// A message plus its scheduling bookkeeping. Owned exclusively by the
/// queue; never exposed to callers.
struct QueueEntry {
    message: Message,
    fingerprint: u64,
    /// Delivery attempts so far. Incremented when poll hands the entry out.
    attempts: u32,
    /// Key into the ready index while awaiting delivery.
    ready_at: Option<Instant>,
    /// Key into the in-flight index while delivered but unacknowledged.
    deadline: Option<Instant>,
}

#[derive(Default)]
struct QueueState {
    next_seq: u64,
    entries: HashMap<u64, QueueEntry>,
    /// Entries awaiting delivery, ordered by (scheduled time, insertion order).
    ready: BTreeSet<(Instant, u64)>,
    /// Delivered, unacknowledged entries ordered by visibility deadline.
    in_flight: BTreeSet<(Instant, u64)>,
    /// Fingerprints of every unacknowledged entry, for duplicate suppression.
    fingerprints: HashMap<u64, u64>,
}

/// Mutex-guarded in-process queue. push, poll, and the redelivery sweep are
/// mutually exclusive over the whole entry store; callbacks run with the
/// lock released so they may push or ack re-entrantly.
pub struct InMemoryQueue {
    clock: Arc<dyn Clock>,
    config: QueueConfig,
    dead_message_callback: DeadMessageCallback,
    state: Arc<Mutex<QueueState>>,
    metrics: Arc<Metrics>,
}

impl InMemoryQueue {
    pub fn new(
        clock: Arc<dyn Clock>,
        config: QueueConfig,
        dead_message_callback: DeadMessageCallback,
    ) -> Self {
        Self {
            clock,
            config,
            dead_message_callback,
            state: Arc::new(Mutex::new(QueueState::default())),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Entries awaiting delivery, delayed ones included.
    pub fn depth(&self) -> usize {
        self.state.lock().ready.len()
    }

    /// Delivered, unacknowledged entries.
    pub fn in_flight_count(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    fn acknowledge(state: &Mutex<QueueState>, metrics: &Metrics, seq: u64, attempt: u32) {
        let mut state = state.lock();
        match state.entries.get(&seq) {
            None => {
                warn!(seq, "ack for an entry no longer in the queue, ignoring");
                return;
            }
            Some(entry) if entry.attempts != attempt => {
                warn!(
                    seq,
                    issued_for = attempt,
                    current = entry.attempts,
                    "stale ack ignored, entry was redelivered"
                );
                return;
            }
            Some(_) => {}
        }
        if let Some(entry) = state.entries.remove(&seq) {
            state.fingerprints.remove(&entry.fingerprint);
            if let Some(deadline) = entry.deadline {
                state.in_flight.remove(&(deadline, seq));
            }
            if let Some(ready_at) = entry.ready_at {
                state.ready.remove(&(ready_at, seq));
            }
            metrics.record_ack();
            metrics.record_depth(state.ready.len() as u64, state.in_flight.len() as u64);
            debug!(seq, "message acknowledged");
        }
    }
}

impl Queue for InMemoryQueue {
    fn push_delayed(&self, message: Message, delay: Duration) {
        let fingerprint = message.fingerprint();
        let deliver_at = self.clock.now() + delay;
        let mut state = self.state.lock();

        if let Some(&existing) = state.fingerprints.get(&fingerprint) {
            debug!(
                kind = ?message.kind(),
                execution_id = %message.execution_id(),
                seq = existing,
                "identical message already unacknowledged, push suppressed"
            );
            self.metrics.record_duplicate();
            return;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.fingerprints.insert(fingerprint, seq);
        state.ready.insert((deliver_at, seq));
        state.entries.insert(
            seq,
            QueueEntry {
                message,
                fingerprint,
                attempts: 0,
                ready_at: Some(deliver_at),
                deadline: None,
            },
        );
        self.metrics.record_push();
        self.metrics
            .record_depth(state.ready.len() as u64, state.in_flight.len() as u64);
        debug!(seq, delay_ms = delay.as_millis() as u64, "message pushed");
    }

    fn poll(&self, callback: &mut dyn FnMut(Message, Ack)) {
        let (message, seq, attempt) = {
            let now = self.clock.now();
            let mut state = self.state.lock();

            let Some(&(ready_at, seq)) = state.ready.iter().next() else {
                return;
            };
            if ready_at > now {
                // Earliest entry is still delayed, so nothing is ready.
                return;
            }
            state.ready.remove(&(ready_at, seq));

            let deadline = now + self.config.ack_timeout();
            let Some(entry) = state.entries.get_mut(&seq) else {
                warn!(seq, "ready index referenced a missing entry, dropping");
                return;
            };
            entry.attempts += 1;
            entry.ready_at = None;
            entry.deadline = Some(deadline);
            let attempt = entry.attempts;
            let message = entry.message.clone();
            state.in_flight.insert((deadline, seq));

            self.metrics.record_delivery();
            self.metrics
                .record_depth(state.ready.len() as u64, state.in_flight.len() as u64);
            debug!(seq, attempt, kind = ?message.kind(), "message delivered");
            (message, seq, attempt)
        };

        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let ack: Ack = Box::new(move || Self::acknowledge(&state, &metrics, seq, attempt));
        callback(message, ack);
    }

    fn retry(&self) {
        let dead = {
            let now = self.clock.now();
            let mut state = self.state.lock();

            let expired: Vec<(Instant, u64)> = state
                .in_flight
                .iter()
                .take_while(|(deadline, _)| *deadline <= now)
                .copied()
                .collect();

            let mut dead = Vec::new();
            for (deadline, seq) in expired {
                state.in_flight.remove(&(deadline, seq));
                let Some(mut entry) = state.entries.remove(&seq) else {
                    warn!(seq, "in-flight index referenced a missing entry, dropping");
                    continue;
                };

                let budget = entry
                    .message
                    .attributes
                    .get::<MaxAttemptsAttribute>()
                    .map(|attribute| attribute.0)
                    .unwrap_or(self.config.max_retries);

                if entry.attempts >= budget {
                    state.fingerprints.remove(&entry.fingerprint);
                    warn!(
                        seq,
                        attempts = entry.attempts,
                        kind = ?entry.message.kind(),
                        execution_id = %entry.message.execution_id(),
                        "redelivery budget exhausted, dead-lettering"
                    );
                    dead.push(entry.message);
                } else {
                    entry.deadline = None;
                    entry.ready_at = Some(now);
                    state.ready.insert((now, seq));
                    state.entries.insert(seq, entry);
                    self.metrics.record_redelivery();
                    debug!(seq, "expired in-flight entry made redeliverable");
                }
            }
            self.metrics
                .record_depth(state.ready.len() as u64, state.in_flight.len() as u64);
            dead
        };

        for message in dead {
            self.metrics.record_dead_letter();
            (self.dead_message_callback)(self, &message);
        }
    }

    fn ack_timeout(&self) -> Duration {
        self.config.ack_timeout()
    }
}
