use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Typed side-table attached to a message instance. Attributes are mutable
/// bookkeeping that travels with the message but is excluded from its
/// identity and from the wire format.
///
/// Cloning is shallow: the clone shares attribute values with the original,
/// but `set`/`remove` on one never affects the other.
#[derive(Clone, Default)]
pub struct Attributes {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Attributes {
    pub fn get<A: Any + Send + Sync>(&self) -> Option<&A> {
        self.entries
            .get(&TypeId::of::<A>())
            .and_then(|value| value.downcast_ref::<A>())
    }

    pub fn set<A: Any + Send + Sync>(&mut self, attribute: A) {
        self.entries.insert(TypeId::of::<A>(), Arc::new(attribute));
    }

    pub fn remove<A: Any + Send + Sync>(&mut self) -> Option<Arc<A>> {
        self.entries
            .remove(&TypeId::of::<A>())
            .and_then(|value| value.downcast::<A>().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Per-message redelivery budget. When present, overrides the queue-wide
/// `max_retries` for this message only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAttemptsAttribute(pub u32);

/// Accumulated time a message spent throttled upstream. Opaque to the queue;
/// maintained by producers for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalThrottleTimeAttribute(pub Duration);
