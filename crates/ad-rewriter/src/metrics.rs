//! Telemetry for the scan-and-patch cycle.
//!
//! Lightweight process-wide counters plus latency aggregates so a host can
//! surface basic numbers without an external metrics backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static SCAN_TOTAL: AtomicU64 = AtomicU64::new(0);
static SCAN_LAT_NS: AtomicU64 = AtomicU64::new(0);
static SCAN_LAT_SAMPLES: AtomicU64 = AtomicU64::new(0);

static ELEMENTS_FOUND: AtomicU64 = AtomicU64::new(0);
static PATCH_APPLIED: AtomicU64 = AtomicU64::new(0);
static PATCH_SKIPPED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanMetric {
    pub total: u64,
    pub avg_ms: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub scans: ScanMetric,
    pub elements_found: u64,
    pub patches_applied: u64,
    pub patches_skipped: u64,
}

pub fn record_scan(found: usize, patched: usize, skipped: usize, duration: Duration) {
    SCAN_TOTAL.fetch_add(1, Ordering::Relaxed);
    ELEMENTS_FOUND.fetch_add(found as u64, Ordering::Relaxed);
    PATCH_APPLIED.fetch_add(patched as u64, Ordering::Relaxed);
    PATCH_SKIPPED.fetch_add(skipped as u64, Ordering::Relaxed);
    SCAN_LAT_NS.fetch_add(duration_to_nanos(duration), Ordering::Relaxed);
    SCAN_LAT_SAMPLES.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    let total = SCAN_TOTAL.load(Ordering::Relaxed);
    let nanos = SCAN_LAT_NS.load(Ordering::Relaxed);
    let samples = SCAN_LAT_SAMPLES.load(Ordering::Relaxed);
    let avg_ms = if samples == 0 {
        0.0
    } else {
        (nanos as f64 / samples as f64) / 1_000_000.0
    };
    MetricSnapshot {
        scans: ScanMetric { total, avg_ms },
        elements_found: ELEMENTS_FOUND.load(Ordering::Relaxed),
        patches_applied: PATCH_APPLIED.load(Ordering::Relaxed),
        patches_skipped: PATCH_SKIPPED.load(Ordering::Relaxed),
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    let nanos = duration.as_nanos();
    if nanos > u64::MAX as u128 {
        u64::MAX
    } else {
        nanos as u64
    }
}
