use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use ad_rewriter::{install, ScanCycle, Subscription};
use adweave_core_types::TargetingPatch;
use adweave_event_bus::DomEventBus;
use adweave_scheduler::Scheduler;
use dom_adapter::DomHost;
use frame_bridge::{FrameMessenger, COMMAND_IDENTIFY};
use segment_store::{SegmentStore, SEGMENTS_KEY};

use crate::config::ElementConfig;
use crate::ports::{ClientIdProvider, FrameLoader};

/// Host-driven lifecycle surface. The embedding runtime maps its own
/// build/layout/unlayout callbacks onto these hooks; none of them can fail.
#[async_trait]
pub trait ElementLifecycle: Send + Sync {
    async fn on_create(&self);
    async fn on_attach(&self);
    async fn on_detach(&self);
}

/// Telemetry snapshot a host can poll or serialize into its own reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ElementMetrics {
    pub rewriter: ad_rewriter::metrics::MetricSnapshot,
    pub bridge: frame_bridge::metrics::MetricSnapshot,
}

#[derive(Default)]
struct ElementState {
    cycle: Option<Arc<ScanCycle>>,
    subscription: Option<Subscription>,
    messenger: Option<Arc<FrameMessenger>>,
}

/// The assembled component.
///
/// `on_create` reads the persisted segments value exactly once to seed the
/// targeting patch: a segments update arriving later is persisted but only
/// takes effect on the next construction.
pub struct AdWeaveElement {
    config: ElementConfig,
    host: Arc<dyn DomHost>,
    bus: DomEventBus,
    store: Arc<dyn SegmentStore>,
    loader: Arc<dyn FrameLoader>,
    client_ids: Arc<dyn ClientIdProvider>,
    scheduler: Arc<Scheduler>,
    state: AsyncMutex<ElementState>,
}

impl AdWeaveElement {
    pub fn new(
        host: Arc<dyn DomHost>,
        bus: DomEventBus,
        store: Arc<dyn SegmentStore>,
        loader: Arc<dyn FrameLoader>,
        client_ids: Arc<dyn ClientIdProvider>,
        config: ElementConfig,
    ) -> Self {
        let scheduler = Scheduler::start(config.scheduler.clone());
        Self {
            config,
            host,
            bus,
            store,
            loader,
            client_ids,
            scheduler,
            state: AsyncMutex::new(ElementState::default()),
        }
    }

    /// Current scan and frame-channel counters. Process-wide, like the
    /// stores underneath them.
    pub fn metrics(&self) -> ElementMetrics {
        ElementMetrics {
            rewriter: ad_rewriter::metrics::snapshot(),
            bridge: frame_bridge::metrics::snapshot(),
        }
    }

    fn seed_patch(&self) -> TargetingPatch {
        let value = match self.store.get(SEGMENTS_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => String::new(),
            Err(err) => {
                warn!(target: "adweave-element", %err, "segment read failed, starting untargeted");
                String::new()
            }
        };
        TargetingPatch::new(&self.config.targeting_key, value)
    }
}

#[async_trait]
impl ElementLifecycle for AdWeaveElement {
    async fn on_create(&self) {
        let mut state = self.state.lock().await;
        if state.cycle.is_some() {
            debug!(target: "adweave-element", "on_create called twice, ignoring");
            return;
        }

        let cycle = ScanCycle::new(
            Arc::clone(&self.host),
            Arc::clone(&self.scheduler),
            self.config.root.clone(),
            self.seed_patch(),
            self.config.rewriter.clone(),
        );
        state.subscription = Some(install(&self.bus, Arc::clone(&cycle)));
        let _ = cycle.trigger_initial_scan();
        state.cycle = Some(cycle);
        debug!(target: "adweave-element", root = %self.config.root, "component created");
    }

    async fn on_attach(&self) {
        let mut state = self.state.lock().await;
        if state.messenger.is_some() {
            debug!(target: "adweave-element", "on_attach called twice, ignoring");
            return;
        }

        let frame = match self.loader.create_frame(&self.config.bridge).await {
            Ok(frame) => frame,
            Err(err) => {
                warn!(target: "adweave-element", %err, "frame creation failed, running without channel");
                return;
            }
        };

        let messenger = FrameMessenger::start(
            frame.channel,
            frame.transport,
            Arc::clone(&self.store),
            frame.loaded,
        );
        state.messenger = Some(Arc::clone(&messenger));
        drop(state);

        match self.client_ids.client_id().await {
            Ok(client_id) => {
                messenger
                    .send(COMMAND_IDENTIFY, Value::String(client_id))
                    .await;
            }
            Err(err) => {
                warn!(target: "adweave-element", %err, "client id resolution failed, identify skipped");
            }
        }
    }

    async fn on_detach(&self) {
        let mut state = self.state.lock().await;
        if let Some(messenger) = state.messenger.take() {
            messenger.close().await;
        }
        if let Some(subscription) = state.subscription.take() {
            subscription.dispose().await;
        }
        state.cycle = None;
        debug!(target: "adweave-element", "component detached");
    }
}
