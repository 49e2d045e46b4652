use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// What kind of execution a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionType {
    Pipeline,
    Orchestration,
}

/// Which phase of a stage a control message targets. Older serialized
/// messages predate this field and deserialize to `Main`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePhase {
    Before,
    #[default]
    Main,
    After,
}

/// Why a configuration error message was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigErrorReason {
    InvalidExecutionType,
    InvalidStageType,
    InvalidTaskType,
    NoDownstreamTasks,
}

/// One queue-worthy operation, discriminated by a `kind` tag on the wire.
/// This is the identity-relevant part of a [`Message`]: two payloads that are
/// structurally equal are duplicates of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    StartExecution {
        execution_type: ExecutionType,
        execution_id: String,
        application: String,
    },
    StartStage {
        execution_type: ExecutionType,
        execution_id: String,
        application: String,
        stage_id: String,
        #[serde(default)]
        phase: StagePhase,
    },
    CompleteExecution {
        execution_type: ExecutionType,
        execution_id: String,
        application: String,
    },
    ContinueParentStage {
        execution_type: ExecutionType,
        execution_id: String,
        application: String,
        stage_id: String,
        #[serde(default)]
        phase: StagePhase,
    },
    InvalidExecutionId {
        execution_type: ExecutionType,
        execution_id: String,
        application: String,
    },
    ConfigurationError {
        execution_type: ExecutionType,
        execution_id: String,
        application: String,
        reason: ConfigErrorReason,
    },
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::StartExecution { .. } => MessageKind::StartExecution,
            Payload::StartStage { .. } => MessageKind::StartStage,
            Payload::CompleteExecution { .. } => MessageKind::CompleteExecution,
            Payload::ContinueParentStage { .. } => MessageKind::ContinueParentStage,
            Payload::InvalidExecutionId { .. } => MessageKind::InvalidExecutionId,
            Payload::ConfigurationError { .. } => MessageKind::ConfigurationError,
        }
    }

    pub fn execution_type(&self) -> ExecutionType {
        match self {
            Payload::StartExecution { execution_type, .. }
            | Payload::StartStage { execution_type, .. }
            | Payload::CompleteExecution { execution_type, .. }
            | Payload::ContinueParentStage { execution_type, .. }
            | Payload::InvalidExecutionId { execution_type, .. }
            | Payload::ConfigurationError { execution_type, .. } => *execution_type,
        }
    }

    pub fn execution_id(&self) -> &str {
        match self {
            Payload::StartExecution { execution_id, .. }
            | Payload::StartStage { execution_id, .. }
            | Payload::CompleteExecution { execution_id, .. }
            | Payload::ContinueParentStage { execution_id, .. }
            | Payload::InvalidExecutionId { execution_id, .. }
            | Payload::ConfigurationError { execution_id, .. } => execution_id,
        }
    }

    pub fn application(&self) -> &str {
        match self {
            Payload::StartExecution { application, .. }
            | Payload::StartStage { application, .. }
            | Payload::CompleteExecution { application, .. }
            | Payload::ContinueParentStage { application, .. }
            | Payload::InvalidExecutionId { application, .. }
            | Payload::ConfigurationError { application, .. } => application,
        }
    }
}

/// Fieldless discriminant of [`Payload`], used for handler dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    StartExecution,
    StartStage,
    CompleteExecution,
    ContinueParentStage,
    InvalidExecutionId,
    ConfigurationError,
}

/// Explicit grouping table standing in for subtype relationships between
/// message kinds. A handler subscribed to a group accepts every kind in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageGroup {
    /// Stage-scoped control messages.
    Stage,
    /// Messages reporting a broken execution reference or configuration.
    Error,
}

impl MessageKind {
    /// The group this kind belongs to, if any. Each kind has at most one.
    pub fn group(self) -> Option<MessageGroup> {
        match self {
            MessageKind::StartStage | MessageKind::ContinueParentStage => {
                Some(MessageGroup::Stage)
            }
            MessageKind::InvalidExecutionId | MessageKind::ConfigurationError => {
                Some(MessageGroup::Error)
            }
            MessageKind::StartExecution | MessageKind::CompleteExecution => None,
        }
    }
}

/// The unit of work: a payload plus its attribute side-table.
///
/// Equality, hashing, and the dedup fingerprint all consider the payload
/// only. Attributes never influence identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(flatten)]
    pub payload: Payload,
    #[serde(skip)]
    pub attributes: Attributes,
}

impl Message {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            attributes: Attributes::default(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    pub fn execution_type(&self) -> ExecutionType {
        self.payload.execution_type()
    }

    pub fn execution_id(&self) -> &str {
        self.payload.execution_id()
    }

    pub fn application(&self) -> &str {
        self.payload.application()
    }

    /// Dedup fingerprint derived from the identity-relevant fields.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.payload.hash(&mut hasher);
        hasher.finish()
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        Message::new(payload)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.payload.hash(state);
    }
}
