use super::*;
use crate::clock::Clock;
use parking_lot::Mutex;
use std::sync::Arc;

/// Queue under test with its controllable clock and a recording
/// dead-letter callback.
pub(super) struct TestQueue {
    pub(super) queue: InMemoryQueue,
    pub(super) clock: Arc<ManualClock>,
    pub(super) dead: Arc<Mutex<Vec<Message>>>,
}

pub(super) fn test_queue() -> TestQueue {
    test_queue_with_config(QueueConfig::default())
}

pub(super) fn test_queue_with_config(config: QueueConfig) -> TestQueue {
    let clock = Arc::new(ManualClock::new());
    let dead = Arc::new(Mutex::new(Vec::new()));
    let callback: DeadMessageCallback = {
        let dead = Arc::clone(&dead);
        Arc::new(move |_queue, message| dead.lock().push(message.clone()))
    };
    let queue = InMemoryQueue::new(Arc::clone(&clock) as Arc<dyn Clock>, config, callback);
    TestQueue { queue, clock, dead }
}

pub(super) fn start_execution(execution_id: &str) -> Message {
    Message::new(Payload::StartExecution {
        execution_type: ExecutionType::Pipeline,
        execution_id: execution_id.to_string(),
        application: "keel".to_string(),
    })
}

pub(super) fn start_stage(execution_id: &str, stage_id: &str) -> Message {
    Message::new(Payload::StartStage {
        execution_type: ExecutionType::Pipeline,
        execution_id: execution_id.to_string(),
        application: "keel".to_string(),
        stage_id: stage_id.to_string(),
        phase: Default::default(),
    })
}

/// Single poll attempt, returning the delivery if one happened.
pub(super) fn poll_one(queue: &InMemoryQueue) -> Option<(Message, Ack)> {
    let mut delivered = None;
    queue.poll(&mut |message, ack| {
        delivered = Some((message, ack));
    });
    delivered
}

/// Poll and immediately acknowledge, returning the delivered message.
pub(super) fn poll_and_ack(queue: &InMemoryQueue) -> Option<Message> {
    poll_one(queue).map(|(message, ack)| {
        ack();
        message
    })
}

/// Poll without acknowledging, returning the delivered message and dropping
/// the ack capability.
pub(super) fn poll_no_ack(queue: &InMemoryQueue) -> Option<Message> {
    poll_one(queue).map(|(message, _ack)| message)
}

/// Let the in-flight delivery expire and run the redelivery sweep.
pub(super) fn expire_and_sweep(test: &TestQueue) {
    test.clock
        .advance(test.queue.ack_timeout() + Duration::from_millis(1));
    test.queue.retry();
}
