use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shared error currency for the AdWeave crates.
///
/// Nothing in the scan/merge/message path is allowed to surface a fatal
/// error to the host, so a single message-carrying variant is enough; crates
/// that need richer taxonomies keep their own kind enums and convert at the
/// boundary.
#[derive(Debug, Error, Clone)]
pub enum WeaveError {
    #[error("{message}")]
    Message { message: String },
}

impl WeaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Identity of a child frame window. Inbound messages are accepted only when
/// their source matches the frame id recorded at channel creation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub String);

impl FrameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a DOM element. Handles are transient: every scan pass re-queries
/// the tree and works with whatever handles come back, with no cross-scan
/// identity tracking.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope a scan pass runs over: the whole document or one shadow subtree.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RootNode {
    Document,
    Subtree(ElementId),
}

impl fmt::Display for RootNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootNode::Document => write!(f, "document"),
            RootNode::Subtree(host) => write!(f, "subtree:{}", host.0),
        }
    }
}

/// The single key/value pair merged into every ad element's targeting map.
/// Immutable for the lifetime of a component instance; a new value persisted
/// by the frame channel only takes effect on the next construction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TargetingPatch {
    pub key: String,
    pub value: String,
}

impl TargetingPatch {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for TargetingPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
