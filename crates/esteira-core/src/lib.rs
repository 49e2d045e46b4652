pub mod attributes;
pub mod clock;
pub mod error;
pub mod handler;
pub mod message;
pub mod processor;
pub mod queue;
pub mod shovel;
pub mod telemetry;

pub use attributes::{Attributes, MaxAttemptsAttribute, TotalThrottleTimeAttribute};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{HandlerError, ProcessorError};
pub use handler::{MessageHandler, Subscription};
pub use message::{ExecutionType, Message, MessageGroup, MessageKind, Payload, StagePhase};
pub use processor::{DiscoveryStatus, QueueProcessor};
pub use queue::{Ack, DeadMessageCallback, InMemoryQueue, Queue, QueueConfig};
pub use shovel::QueueShovel;
