use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use adweave_core_types::{RootNode, WeaveError};

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

/// The host-level "DOM updated" signal. It carries no payload beyond which
/// root changed; every scan pass is a full rescan, so subscribers that lag
/// and miss a signal lose nothing a later pass will not recover.
#[derive(Clone, Debug)]
pub enum DomSignal {
    Updated { root: RootNode },
}

impl DomSignal {
    pub fn root(&self) -> &RootNode {
        match self {
            DomSignal::Updated { root } => root,
        }
    }
}

/// Publish side of the DOM-update signal. A host adapter bridging a real
/// document's update event publishes into this trait; the in-memory DOM
/// does the same in tests.
#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    /// Fan the event out to every current subscriber. Publishing to an
    /// empty bus is reported as an error so callers can log the gap, but
    /// no signal is ever owed retroactively to late subscribers.
    async fn publish(&self, event: E) -> Result<(), WeaveError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Broadcast-channel bus. Slow subscribers may lag and drop signals, which
/// is safe here: every scan pass is a full rescan, so the next signal
/// repairs whatever a missed one would have triggered.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), WeaveError> {
        match self.sender.send(event) {
            Ok(_receivers) => Ok(()),
            Err(err) => Err(WeaveError::new(err.to_string())),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Bus specialisation used between the DOM adapter and the mutation listener.
pub type DomEventBus = Arc<InMemoryBus<DomSignal>>;

pub fn dom_event_bus(capacity: usize) -> DomEventBus {
    InMemoryBus::new(capacity)
}
