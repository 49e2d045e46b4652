use opentelemetry::metrics::{Counter, Gauge, Meter};

/// OTel metrics for the queue. Created once at queue construction; if no
/// meter provider is configured the instruments are no-op.
pub struct Metrics {
    pub messages_pushed: Counter<u64>,
    pub duplicates_suppressed: Counter<u64>,
    pub messages_delivered: Counter<u64>,
    pub messages_acked: Counter<u64>,
    pub messages_redelivered: Counter<u64>,
    pub messages_dead_lettered: Counter<u64>,
    pub queue_depth: Gauge<u64>,
    pub in_flight: Gauge<u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter("esteira");
        Self::from_meter(&meter)
    }

    pub fn from_meter(meter: &Meter) -> Self {
        Self {
            messages_pushed: meter
                .u64_counter("esteira.messages.pushed")
                .with_description("Total messages accepted by push")
                .build(),
            duplicates_suppressed: meter
                .u64_counter("esteira.messages.duplicates_suppressed")
                .with_description("Pushes dropped because an identical message was unacknowledged")
                .build(),
            messages_delivered: meter
                .u64_counter("esteira.messages.delivered")
                .with_description("Deliveries handed to poll callbacks, redeliveries included")
                .build(),
            messages_acked: meter
                .u64_counter("esteira.messages.acked")
                .with_description("Total messages acknowledged")
                .build(),
            messages_redelivered: meter
                .u64_counter("esteira.messages.redelivered")
                .with_description("Expired in-flight entries returned to the ready pool")
                .build(),
            messages_dead_lettered: meter
                .u64_counter("esteira.messages.dead_lettered")
                .with_description("Messages removed after exhausting their redelivery budget")
                .build(),
            queue_depth: meter
                .u64_gauge("esteira.queue.depth")
                .with_description("Entries awaiting delivery")
                .build(),
            in_flight: meter
                .u64_gauge("esteira.queue.in_flight")
                .with_description("Delivered, unacknowledged entries")
                .build(),
        }
    }

    pub fn record_push(&self) {
        self.messages_pushed.add(1, &[]);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_suppressed.add(1, &[]);
    }

    pub fn record_delivery(&self) {
        self.messages_delivered.add(1, &[]);
    }

    pub fn record_ack(&self) {
        self.messages_acked.add(1, &[]);
    }

    pub fn record_redelivery(&self) {
        self.messages_redelivered.add(1, &[]);
    }

    pub fn record_dead_letter(&self) {
        self.messages_dead_lettered.add(1, &[]);
    }

    pub fn record_depth(&self, ready: u64, in_flight: u64) {
        self.queue_depth.record(ready, &[]);
        self.in_flight.record(in_flight, &[]);
    }
}
