use crate::error::{HandlerError, ProcessorError};
use crate::message::{Message, MessageGroup, MessageKind};

/// What a handler accepts: one concrete message kind, or every kind in a
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Kind(MessageKind),
    Group(MessageGroup),
}

impl Subscription {
    pub fn accepts(&self, kind: MessageKind) -> bool {
        match *self {
            Subscription::Kind(subscribed) => subscribed == kind,
            Subscription::Group(group) => kind.group() == Some(group),
        }
    }
}

/// Per-message-kind strategy performing the actual execution-engine action.
/// Concrete handlers are supplied by the execution runner.
pub trait MessageHandler: Send + Sync {
    fn subscription(&self) -> Subscription;

    fn handle(&self, message: &Message) -> Result<(), HandlerError>;

    /// Guarded dispatch: asserts the message's runtime kind is within this
    /// handler's subscription before calling `handle`. The guard is
    /// independent of the processor's own dispatch matching.
    fn invoke(&self, message: &Message) -> Result<(), ProcessorError> {
        let subscription = self.subscription();
        if !subscription.accepts(message.kind()) {
            return Err(ProcessorError::IllegalMessageKind {
                subscription,
                actual: message.kind(),
            });
        }
        self.handle(message).map_err(ProcessorError::Handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ExecutionType, Payload};

    struct NoopHandler(Subscription);

    impl MessageHandler for NoopHandler {
        fn subscription(&self) -> Subscription {
            self.0
        }

        fn handle(&self, _message: &Message) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    fn invalid_execution_id() -> Message {
        Message::new(Payload::InvalidExecutionId {
            execution_type: ExecutionType::Pipeline,
            execution_id: "ex-1".to_string(),
            application: "keel".to_string(),
        })
    }

    fn complete_execution() -> Message {
        Message::new(Payload::CompleteExecution {
            execution_type: ExecutionType::Pipeline,
            execution_id: "ex-1".to_string(),
            application: "keel".to_string(),
        })
    }

    #[test]
    fn kind_subscription_accepts_only_that_kind() {
        let subscription = Subscription::Kind(MessageKind::StartExecution);
        assert!(subscription.accepts(MessageKind::StartExecution));
        assert!(!subscription.accepts(MessageKind::StartStage));
    }

    #[test]
    fn group_subscription_accepts_every_kind_in_the_group() {
        let subscription = Subscription::Group(MessageGroup::Error);
        assert!(subscription.accepts(MessageKind::InvalidExecutionId));
        assert!(subscription.accepts(MessageKind::ConfigurationError));
        assert!(!subscription.accepts(MessageKind::StartExecution));
    }

    #[test]
    fn invoke_accepts_group_member() {
        let handler = NoopHandler(Subscription::Group(MessageGroup::Error));
        assert!(handler.invoke(&invalid_execution_id()).is_ok());
    }

    #[test]
    fn invoke_rejects_message_outside_subscription() {
        let handler = NoopHandler(Subscription::Kind(MessageKind::StartExecution));
        let err = handler.invoke(&complete_execution()).unwrap_err();
        assert!(
            matches!(
                err,
                ProcessorError::IllegalMessageKind {
                    actual: MessageKind::CompleteExecution,
                    ..
                }
            ),
            "expected IllegalMessageKind, got {err:?}"
        );
    }
}
