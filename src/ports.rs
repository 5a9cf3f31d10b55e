use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use adweave_core_types::WeaveError;
use frame_bridge::{BridgeConfig, FrameChannel, FrameTransport};

/// A created-and-loading child frame: its channel identity, the transport
/// bound to it, and the host's load-completion signal.
pub struct LoadedFrame {
    pub channel: FrameChannel,
    pub transport: Arc<dyn FrameTransport>,
    pub loaded: oneshot::Receiver<()>,
}

/// Host seam that creates the vendor iframe and reports when it has loaded.
#[async_trait]
pub trait FrameLoader: Send + Sync {
    async fn create_frame(&self, config: &BridgeConfig) -> Result<LoadedFrame, WeaveError>;
}

/// Host seam resolving the visitor id sent with the identify command.
#[async_trait]
pub trait ClientIdProvider: Send + Sync {
    async fn client_id(&self) -> Result<String, WeaveError>;
}
