use serde::{Deserialize, Serialize};
use serde_json::Value;

use adweave_core_types::FrameId;

/// Command sent by the assembly layer once the frame is ready and the
/// client id has been resolved.
pub const COMMAND_IDENTIFY: &str = "identify";

/// The only inbound event discriminator with a defined handler.
pub const EVENT_SEGMENTS: &str = "segments";

/// Outbound command envelope, serialized as text before posting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub command: String,
    pub args: Value,
}

impl OutboundEnvelope {
    pub fn new(command: impl Into<String>, args: Value) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// Inbound payloads arrive either as serialized text or as an already
/// structured value, mirroring what a message event's data slot can carry.
#[derive(Clone, Debug)]
pub enum MessageData {
    Text(String),
    Structured(Value),
}

#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub source: FrameId,
    pub data: MessageData,
}

impl InboundMessage {
    pub fn text(source: FrameId, payload: impl Into<String>) -> Self {
        Self {
            source,
            data: MessageData::Text(payload.into()),
        }
    }

    pub fn structured(source: FrameId, payload: Value) -> Self {
        Self {
            source,
            data: MessageData::Structured(payload),
        }
    }
}
