use crate::handler::Subscription;
use crate::message::MessageKind;

/// Failures reported by a `MessageHandler`. A handler error leaves the
/// message unacknowledged, so it is redelivered through the normal queue
/// mechanism — this is the at-least-once path for transient failures.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("execution not found: {0}")]
    ExecutionNotFound(String),

    #[error("{0}")]
    Failed(String),
}

/// Dispatch-level errors surfaced by `QueueProcessor::poll_once`.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// No registered handler matches the delivered message's kind, exactly
    /// or by group. The message is left unacknowledged.
    #[error("no handler registered for {0:?} messages")]
    UnsupportedMessage(MessageKind),

    /// A handler's `invoke` was called with a message outside its
    /// subscription. This is a programming-contract violation, not a
    /// recoverable runtime condition.
    #[error("handler subscribed to {subscription:?} invoked with {actual:?} message")]
    IllegalMessageKind {
        subscription: Subscription,
        actual: MessageKind,
    },

    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),
}
