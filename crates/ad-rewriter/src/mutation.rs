use std::sync::Arc;

use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use adweave_event_bus::{DomEventBus, EventBus};

use crate::cycle::ScanCycle;

/// Handle to the mutation subscription. The listener stays installed for
/// the life of the component; teardown calls `dispose` explicitly.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl Subscription {
    /// Detach from the bus and wait for the listener task to exit. Scans
    /// already scheduled keep running.
    pub async fn dispose(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.task.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }
}

/// Subscribe the cycle to DOM-update signals for its root.
///
/// Installed exactly once per component. Every matching signal schedules an
/// independent pass, including signals arriving while earlier passes are
/// still queued; there is no coalescing and no depth limit.
pub fn install(bus: &DomEventBus, cycle: Arc<ScanCycle>) -> Subscription {
    let mut rx = bus.subscribe();
    let shutdown = CancellationToken::new();
    let listener_shutdown = shutdown.clone();

    let task = tokio::spawn(async move {
        debug!(target: "ad-rewriter", root = %cycle.root(), "mutation listener installed");
        loop {
            select! {
                _ = listener_shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(signal) => {
                        if signal.root() == cycle.root() {
                            let _ = cycle.on_mutation();
                        }
                    }
                    // Lagging only means missed signals; the next signal
                    // triggers a full rescan anyway.
                    Err(RecvError::Lagged(missed)) => {
                        debug!(target: "ad-rewriter", missed, "mutation listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!(target: "ad-rewriter", "mutation listener exited");
    });

    Subscription {
        task: Some(task),
        shutdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adweave_core_types::{RootNode, TargetingPatch};
    use adweave_event_bus::{dom_event_bus, DomSignal, EventBus};
    use adweave_scheduler::{Scheduler, SchedulerConfig};
    use dom_adapter::{DomHost, InMemoryDom};
    use std::time::Duration;
    use tokio::time::sleep;

    use crate::config::RewriterConfig;

    #[tokio::test]
    async fn mutation_signal_triggers_rescan() {
        let bus = dom_event_bus(8);
        let dom = InMemoryDom::with_bus(bus.clone());
        let cycle = ScanCycle::new(
            dom.clone(),
            Scheduler::start(SchedulerConfig::default()),
            RootNode::Document,
            TargetingPatch::new("permutive", "seg-a"),
            RewriterConfig::default(),
        );

        let subscription = install(&bus, Arc::clone(&cycle));
        // Appending publishes the update signal itself.
        let el = dom.append_element(RootNode::Document, "ad-slot").await;

        let mut patched = false;
        for _ in 0..50 {
            sleep(Duration::from_millis(10)).await;
            if dom.get_attribute(&el, "json").await.expect("get").is_some() {
                patched = true;
                break;
            }
        }
        assert!(patched, "mutation-triggered scan never patched the element");

        subscription.dispose().await;
    }

    #[tokio::test]
    async fn signals_for_other_roots_are_ignored() {
        let bus = dom_event_bus(8);
        let dom = InMemoryDom::new();
        let el = dom.append_element(RootNode::Document, "ad-slot").await;

        let cycle = ScanCycle::new(
            dom.clone(),
            Scheduler::start(SchedulerConfig::default()),
            RootNode::Document,
            TargetingPatch::new("permutive", "seg-a"),
            RewriterConfig::default(),
        );
        let subscription = install(&bus, Arc::clone(&cycle));
        tokio::task::yield_now().await;

        bus.publish(DomSignal::Updated {
            root: RootNode::Subtree(adweave_core_types::ElementId::new()),
        })
        .await
        .expect("publish");
        sleep(Duration::from_millis(50)).await;

        assert_eq!(dom.get_attribute(&el, "json").await.expect("get"), None);
        subscription.dispose().await;
    }

    #[tokio::test]
    async fn disposed_subscription_stops_reacting() {
        let bus = dom_event_bus(8);
        let dom = InMemoryDom::new();
        let el = dom.append_element(RootNode::Document, "ad-slot").await;

        let cycle = ScanCycle::new(
            dom.clone(),
            Scheduler::start(SchedulerConfig::default()),
            RootNode::Document,
            TargetingPatch::new("permutive", "seg-a"),
            RewriterConfig::default(),
        );
        let subscription = install(&bus, Arc::clone(&cycle));
        subscription.dispose().await;

        let _ = bus
            .publish(DomSignal::Updated {
                root: RootNode::Document,
            })
            .await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(dom.get_attribute(&el, "json").await.expect("get"), None);
    }
}
