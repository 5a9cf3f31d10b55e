//! Cross-origin channel to the vendor frame.
//!
//! Owns the single child-frame relationship: commands go out once the frame
//! has finished loading, inbound messages are accepted only from the known
//! frame window, and the only handled event writes the delivered segments
//! value into the segment store. Everything else is dropped silently; the
//! bridge never surfaces an error to the host.

pub mod channel;
pub mod config;
pub mod errors;
pub mod messenger;
pub mod metrics;
pub mod protocol;
pub mod transport;

pub use channel::FrameChannel;
pub use config::BridgeConfig;
pub use errors::BridgeError;
pub use messenger::FrameMessenger;
pub use protocol::{InboundMessage, MessageData, OutboundEnvelope, COMMAND_IDENTIFY, EVENT_SEGMENTS};
pub use transport::{FrameTransport, InMemoryFrameTransport};
