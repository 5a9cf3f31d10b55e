use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;

use crate::errors::BridgeError;
use crate::protocol::InboundMessage;

/// Port onto the host's structured-message channel.
///
/// `post` delivers serialized text to the given recipient origin;
/// `next_inbound` yields raw message events, source identity included.
/// Validation happens above this seam, in the messenger.
#[async_trait]
pub trait FrameTransport: Send + Sync {
    async fn post(&self, payload: String, origin: &str) -> Result<(), BridgeError>;
    async fn next_inbound(&self) -> Option<InboundMessage>;
}

/// Loopback transport for tests: records what was posted and lets the test
/// feed inbound message events.
pub struct InMemoryFrameTransport {
    outbound: Mutex<Vec<(String, String)>>,
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    inbound_rx: AsyncMutex<mpsc::UnboundedReceiver<InboundMessage>>,
}

impl InMemoryFrameTransport {
    pub fn new() -> Arc<Self> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            outbound: Mutex::new(Vec::new()),
            inbound_tx,
            inbound_rx: AsyncMutex::new(inbound_rx),
        })
    }

    /// Inject a message event as if the frame window had posted it.
    pub fn push_inbound(&self, message: InboundMessage) {
        let _ = self.inbound_tx.send(message);
    }

    /// Everything posted so far, as (payload, recipient origin) pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.outbound.lock().clone()
    }
}

#[async_trait]
impl FrameTransport for InMemoryFrameTransport {
    async fn post(&self, payload: String, origin: &str) -> Result<(), BridgeError> {
        self.outbound.lock().push((payload, origin.to_string()));
        Ok(())
    }

    async fn next_inbound(&self) -> Option<InboundMessage> {
        let mut guard = self.inbound_rx.lock().await;
        guard.recv().await
    }
}
