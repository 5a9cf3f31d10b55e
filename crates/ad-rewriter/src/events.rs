use std::time::Duration;

use tracing::{debug, warn};

use adweave_core_types::{ElementId, RootNode};

use crate::cycle::ScanSummary;
use crate::errors::RewriteError;
use crate::metrics;

pub fn emit_scan(root: &RootNode, summary: &ScanSummary, duration: Duration) {
    metrics::record_scan(summary.found, summary.patched, summary.skipped, duration);
    debug!(
        target: "rewriter.events",
        %root,
        found = summary.found,
        patched = summary.patched,
        skipped = summary.skipped,
        "rewriter.scan.completed"
    );
}

pub fn emit_patch_skipped(element: &ElementId, err: &RewriteError) {
    warn!(
        target: "rewriter.events",
        element = %element.0,
        %err,
        "rewriter.patch.skipped"
    );
}
