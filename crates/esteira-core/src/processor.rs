use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::error::ProcessorError;
use crate::handler::{MessageHandler, Subscription};
use crate::message::MessageKind;
use crate::queue::Queue;

/// Fleet-membership status reported by service discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStatus {
    Up,
    OutOfService,
}

/// Polling loop body: pulls one message per `poll_once`, dispatches it to
/// the matching handler, and acknowledges on handler success. Driven by an
/// external fixed-rate scheduler.
///
/// The processor starts disabled and only polls while discovery reports the
/// instance `Up`, so a draining instance stops taking work without touching
/// the queue.
pub struct QueueProcessor {
    queue: Arc<dyn Queue>,
    handlers: Vec<Arc<dyn MessageHandler>>,
    enabled: AtomicBool,
}

impl QueueProcessor {
    pub fn new(queue: Arc<dyn Queue>, handlers: Vec<Arc<dyn MessageHandler>>) -> Self {
        Self {
            queue,
            handlers,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn on_discovery_event(&self, status: DiscoveryStatus) {
        let enable = status == DiscoveryStatus::Up;
        let was_enabled = self.enabled.swap(enable, Ordering::SeqCst);
        if was_enabled != enable {
            info!(?status, enabled = enable, "processor toggled by discovery");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// One delivery attempt. While disabled this does not interact with the
    /// queue at all. A message with no matching handler, or whose handler
    /// fails, is left unacknowledged and surfaces as an error; the queue's
    /// redelivery mechanism takes it from there.
    pub fn poll_once(&self) -> Result<(), ProcessorError> {
        if !self.is_enabled() {
            trace!("processor disabled, skipping poll");
            return Ok(());
        }

        let mut outcome = Ok(());
        self.queue.poll(&mut |message, ack| {
            let kind = message.kind();
            match self.handler_for(kind) {
                None => {
                    warn!(?kind, "no handler registered, message left unacknowledged");
                    outcome = Err(ProcessorError::UnsupportedMessage(kind));
                }
                Some(handler) => match handler.invoke(&message) {
                    Ok(()) => {
                        debug!(?kind, execution_id = %message.execution_id(), "message handled");
                        ack();
                    }
                    Err(error) => {
                        warn!(?kind, %error, "handler failed, message left unacknowledged");
                        outcome = Err(error);
                    }
                },
            }
        });
        outcome
    }

    /// Exact kind match wins; otherwise the first handler subscribed to the
    /// kind's group.
    fn handler_for(&self, kind: MessageKind) -> Option<&Arc<dyn MessageHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.subscription() == Subscription::Kind(kind))
            .or_else(|| {
                self.handlers.iter().find(|handler| {
                    matches!(
                        handler.subscription(),
                        Subscription::Group(group) if kind.group() == Some(group)
                    )
                })
            })
    }
}
