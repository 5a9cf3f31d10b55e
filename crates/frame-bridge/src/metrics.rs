//! Telemetry for the frame channel.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static COMMANDS_SENT: AtomicU64 = AtomicU64::new(0);
static COMMANDS_QUEUED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_DROPPED: AtomicU64 = AtomicU64::new(0);

static MESSAGES_ACCEPTED: AtomicU64 = AtomicU64::new(0);
static MESSAGES_DROPPED_SOURCE: AtomicU64 = AtomicU64::new(0);
static MESSAGES_DROPPED_PARSE: AtomicU64 = AtomicU64::new(0);
static MESSAGES_IGNORED_EVENT: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub commands_sent: u64,
    pub commands_queued: u64,
    pub commands_dropped: u64,
    pub messages_accepted: u64,
    pub messages_dropped_source: u64,
    pub messages_dropped_parse: u64,
    pub messages_ignored_event: u64,
}

pub fn record_command_sent() {
    COMMANDS_SENT.fetch_add(1, Ordering::Relaxed);
}

pub fn record_command_queued() {
    COMMANDS_QUEUED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_command_dropped() {
    COMMANDS_DROPPED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_message_accepted() {
    MESSAGES_ACCEPTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_message_dropped_source() {
    MESSAGES_DROPPED_SOURCE.fetch_add(1, Ordering::Relaxed);
}

pub fn record_message_dropped_parse() {
    MESSAGES_DROPPED_PARSE.fetch_add(1, Ordering::Relaxed);
}

pub fn record_message_ignored_event() {
    MESSAGES_IGNORED_EVENT.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    MetricSnapshot {
        commands_sent: COMMANDS_SENT.load(Ordering::Relaxed),
        commands_queued: COMMANDS_QUEUED.load(Ordering::Relaxed),
        commands_dropped: COMMANDS_DROPPED.load(Ordering::Relaxed),
        messages_accepted: MESSAGES_ACCEPTED.load(Ordering::Relaxed),
        messages_dropped_source: MESSAGES_DROPPED_SOURCE.load(Ordering::Relaxed),
        messages_dropped_parse: MESSAGES_DROPPED_PARSE.load(Ordering::Relaxed),
        messages_ignored_event: MESSAGES_IGNORED_EVENT.load(Ordering::Relaxed),
    }
}
