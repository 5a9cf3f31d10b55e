use std::sync::Arc;
use std::time::Instant;

use adweave_core_types::{RootNode, TargetingPatch};
use adweave_scheduler::{Priority, ScheduledTask, Scheduler};
use dom_adapter::DomHost;

use crate::config::RewriterConfig;
use crate::events;
use crate::merge::apply_patch;
use crate::scanner::find_ads;

/// Outcome of one scan pass. `skipped` counts elements whose merge failed
/// and were left unmodified; the pass itself never fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
    pub found: usize,
    pub patched: usize,
    pub skipped: usize,
}

/// One component's scan-and-merge orchestration.
///
/// The targeting patch is fixed at construction (seeded from the segment
/// store by the assembly layer) and every pass reprocesses every element it
/// finds: merges are idempotent, so overlapping passes converge on the same
/// attribute value.
pub struct ScanCycle {
    host: Arc<dyn DomHost>,
    scheduler: Arc<Scheduler>,
    root: RootNode,
    patch: TargetingPatch,
    config: RewriterConfig,
}

impl ScanCycle {
    pub fn new(
        host: Arc<dyn DomHost>,
        scheduler: Arc<Scheduler>,
        root: RootNode,
        patch: TargetingPatch,
        config: RewriterConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            host,
            scheduler,
            root,
            patch,
            config,
        })
    }

    pub fn root(&self) -> &RootNode {
        &self.root
    }

    pub fn patch(&self) -> &TargetingPatch {
        &self.patch
    }

    /// Run one full scan-and-merge pass and resolve when every element has
    /// been processed.
    pub async fn run_once(&self) -> ScanSummary {
        let started = Instant::now();
        let ads = find_ads(self.host.as_ref(), &self.root, &self.config.ad_selector).await;

        let mut summary = ScanSummary {
            found: ads.len(),
            ..ScanSummary::default()
        };
        for element in &ads {
            if apply_patch(
                self.host.as_ref(),
                element,
                &self.config.config_attr,
                &self.patch,
            )
            .await
            {
                summary.patched += 1;
            } else {
                summary.skipped += 1;
            }
        }

        events::emit_scan(&self.root, &summary, started.elapsed());
        summary
    }

    /// Schedule a deferred pass at background priority. Each call schedules
    /// an independent pass; signals are never coalesced.
    pub fn on_mutation(self: &Arc<Self>) -> ScheduledTask {
        let cycle = Arc::clone(self);
        self.scheduler.enqueue(Priority::Background, async move {
            cycle.run_once().await;
        })
    }

    /// Explicit first pass, independent of any mutation signal ever firing.
    pub fn trigger_initial_scan(self: &Arc<Self>) -> ScheduledTask {
        self.on_mutation()
    }
}
