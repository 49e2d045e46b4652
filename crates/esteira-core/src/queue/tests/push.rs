use super::*;
use crate::attributes::MaxAttemptsAttribute;

#[test]
fn duplicate_push_is_suppressed_before_delivery() {
    let test = test_queue();

    test.queue.push(start_execution("ex-1"));
    test.queue.push(start_execution("ex-1"));

    assert_eq!(test.queue.depth(), 1, "second push should be dropped");
    assert!(poll_and_ack(&test.queue).is_some());
    assert!(
        poll_one(&test.queue).is_none(),
        "only one delivery should occur in total"
    );
}

#[test]
fn distinct_messages_are_not_deduplicated() {
    let test = test_queue();

    test.queue.push(start_execution("ex-1"));
    test.queue.push(start_execution("ex-2"));
    test.queue.push(start_stage("ex-1", "stage-1"));

    assert_eq!(test.queue.depth(), 3);
}

#[test]
fn attributes_do_not_defeat_duplicate_suppression() {
    let test = test_queue();

    test.queue.push(start_execution("ex-1"));
    let mut annotated = start_execution("ex-1");
    annotated.attributes.set(MaxAttemptsAttribute(10));
    test.queue.push(annotated);

    assert_eq!(test.queue.depth(), 1);
}

#[test]
fn push_after_ack_creates_a_fresh_entry() {
    let test = test_queue();

    test.queue.push(start_execution("ex-1"));
    assert!(poll_and_ack(&test.queue).is_some());

    test.queue.push(start_execution("ex-1"));
    assert_eq!(
        poll_and_ack(&test.queue),
        Some(start_execution("ex-1")),
        "identical push after ack should be delivered again"
    );
}

#[test]
fn duplicate_while_in_flight_is_ignored_and_not_replayed_twice() {
    let test = test_queue();

    test.queue.push(start_execution("ex-1"));
    assert!(poll_no_ack(&test.queue).is_some());

    // Identical push while the first copy is unacknowledged.
    test.queue.push(start_execution("ex-1"));
    assert_eq!(test.queue.depth(), 0);

    expire_and_sweep(&test);

    assert!(
        poll_and_ack(&test.queue).is_some(),
        "original should be redelivered after the sweep"
    );
    assert!(
        poll_one(&test.queue).is_none(),
        "the suppressed duplicate must not surface as a second delivery"
    );
}

#[test]
fn duplicate_of_delayed_entry_is_suppressed() {
    let test = test_queue();

    test.queue
        .push_delayed(start_execution("ex-1"), Duration::from_secs(10));
    test.queue.push(start_execution("ex-1"));

    // The duplicate must not jump the delay either.
    assert!(poll_one(&test.queue).is_none());
    test.clock.advance(Duration::from_secs(10));
    assert!(poll_and_ack(&test.queue).is_some());
    assert!(poll_one(&test.queue).is_none());
}
