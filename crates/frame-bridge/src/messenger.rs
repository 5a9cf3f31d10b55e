use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::select;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use segment_store::{SegmentStore, SEGMENTS_KEY};

use crate::channel::FrameChannel;
use crate::metrics;
use crate::protocol::{InboundMessage, MessageData, OutboundEnvelope, EVENT_SEGMENTS};
use crate::transport::FrameTransport;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    FrameLoading,
    Ready,
    Closed,
}

struct SendState {
    phase: Phase,
    queue: VecDeque<OutboundEnvelope>,
}

/// State machine over the frame channel.
///
/// Commands queue until the frame's load signal resolves, then flush in call
/// order; afterwards each send dispatches immediately. Inbound messages are
/// handled only while `Ready` and only when their source matches the channel
/// frame. `close` flips the machine into its terminal state: the listener
/// detaches and later sends become no-ops.
pub struct FrameMessenger {
    channel: FrameChannel,
    transport: Arc<dyn FrameTransport>,
    store: Arc<dyn SegmentStore>,
    state: AsyncMutex<SendState>,
    shutdown: CancellationToken,
    pump: Mutex<Option<JoinHandle<()>>>,
    ready_task: Mutex<Option<JoinHandle<()>>>,
}

impl FrameMessenger {
    /// Attach to a loading frame. `loaded` is the host's load-completion
    /// signal; nothing is dispatched before it resolves.
    pub fn start(
        channel: FrameChannel,
        transport: Arc<dyn FrameTransport>,
        store: Arc<dyn SegmentStore>,
        loaded: oneshot::Receiver<()>,
    ) -> Arc<Self> {
        let messenger = Arc::new(Self {
            channel,
            transport,
            store,
            state: AsyncMutex::new(SendState {
                phase: Phase::FrameLoading,
                queue: VecDeque::new(),
            }),
            shutdown: CancellationToken::new(),
            pump: Mutex::new(None),
            ready_task: Mutex::new(None),
        });

        // Tasks hold weak references so dropping the last host handle tears
        // the machine down even without an explicit close.
        let ready = tokio::spawn(Self::await_ready(Arc::downgrade(&messenger), loaded));
        *messenger.ready_task.lock() = Some(ready);

        let pump = tokio::spawn(Self::run_pump(
            Arc::downgrade(&messenger),
            Arc::clone(&messenger.transport),
            messenger.shutdown.clone(),
        ));
        *messenger.pump.lock() = Some(pump);

        messenger
    }

    /// Queue or dispatch one command. Never fails: before readiness the
    /// command waits, after `close` it is dropped.
    pub async fn send(&self, command: &str, args: Value) {
        let envelope = OutboundEnvelope::new(command, args);
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Closed => {
                metrics::record_command_dropped();
                debug!(target: "frame-bridge", command, "send after close dropped");
            }
            Phase::Ready => {
                // Dispatch under the state lock so concurrent senders keep
                // strict call order on the wire.
                self.post(&envelope).await;
            }
            Phase::FrameLoading => {
                metrics::record_command_queued();
                debug!(target: "frame-bridge", command, "frame not ready, command queued");
                state.queue.push_back(envelope);
            }
        }
    }

    /// Terminal transition. Detaches the message listener and stops
    /// accepting sends; messages already being handled finish.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            state.phase = Phase::Closed;
            state.queue.clear();
        }
        self.shutdown.cancel();
        let pump = self.pump.lock().take();
        if let Some(handle) = pump {
            let _ = handle.await;
        }
        let ready = self.ready_task.lock().take();
        if let Some(handle) = ready {
            handle.abort();
        }
        debug!(target: "frame-bridge", frame = %self.channel.frame.0, "frame channel closed");
    }

    pub fn channel(&self) -> &FrameChannel {
        &self.channel
    }

    async fn await_ready(weak: Weak<Self>, loaded: oneshot::Receiver<()>) {
        if loaded.await.is_err() {
            // Load signal dropped without resolving; queued commands stay
            // parked until close.
            debug!(target: "frame-bridge", "frame load signal dropped before resolving");
            return;
        }
        let Some(messenger) = weak.upgrade() else {
            return;
        };

        let mut state = messenger.state.lock().await;
        if state.phase != Phase::FrameLoading {
            return;
        }
        while let Some(envelope) = state.queue.pop_front() {
            messenger.post(&envelope).await;
        }
        state.phase = Phase::Ready;
        debug!(target: "frame-bridge", frame = %messenger.channel.frame.0, "frame ready, queue flushed");
    }

    async fn run_pump(
        weak: Weak<Self>,
        transport: Arc<dyn FrameTransport>,
        shutdown: CancellationToken,
    ) {
        loop {
            select! {
                _ = shutdown.cancelled() => break,
                inbound = transport.next_inbound() => match inbound {
                    Some(message) => {
                        let Some(messenger) = weak.upgrade() else {
                            break;
                        };
                        messenger.handle_inbound(message).await;
                    }
                    None => break,
                },
            }
        }
        debug!(target: "frame-bridge", "message pump exited");
    }

    async fn handle_inbound(&self, message: InboundMessage) {
        {
            let state = self.state.lock().await;
            if state.phase != Phase::Ready {
                debug!(target: "frame-bridge", "message before readiness discarded");
                return;
            }
        }

        if message.source != self.channel.frame {
            metrics::record_message_dropped_source();
            debug!(
                target: "frame-bridge",
                source = %message.source.0,
                "message from unknown window discarded"
            );
            return;
        }

        let Some(payload) = decode_payload(message.data) else {
            metrics::record_message_dropped_parse();
            debug!(target: "frame-bridge", "unparseable message discarded");
            return;
        };

        match payload.get("event").and_then(Value::as_str) {
            Some(EVENT_SEGMENTS) => self.persist_segments(&payload),
            Some(other) => {
                metrics::record_message_ignored_event();
                debug!(target: "frame-bridge", event = other, "unhandled event ignored");
            }
            None => {
                metrics::record_message_dropped_parse();
                debug!(target: "frame-bridge", "message without event discriminator discarded");
            }
        }
    }

    fn persist_segments(&self, payload: &Value) {
        let Some(raw) = payload.get("segments") else {
            metrics::record_message_dropped_parse();
            debug!(target: "frame-bridge", "segments event without segments field discarded");
            return;
        };
        // Stored verbatim, no shape validation; non-string values keep their
        // serialized form.
        let value = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match self.store.put(SEGMENTS_KEY, &value) {
            Ok(()) => {
                metrics::record_message_accepted();
                debug!(target: "frame-bridge", "segments value persisted");
            }
            Err(err) => {
                warn!(target: "frame-bridge", %err, "segments persist failed");
            }
        }
    }

    async fn post(&self, envelope: &OutboundEnvelope) {
        let payload = match serde_json::to_string(envelope) {
            Ok(text) => text,
            Err(err) => {
                metrics::record_command_dropped();
                warn!(target: "frame-bridge", %err, "command serialize failed");
                return;
            }
        };
        match self.transport.post(payload, &self.channel.origin).await {
            Ok(()) => metrics::record_command_sent(),
            Err(err) => {
                metrics::record_command_dropped();
                warn!(target: "frame-bridge", %err, "command post failed");
            }
        }
    }
}

/// Message payloads must be JSON objects; text payloads are parsed first.
/// Anything else is discarded without error.
fn decode_payload(data: MessageData) -> Option<Value> {
    match data {
        MessageData::Structured(value) if value.is_object() => Some(value),
        MessageData::Structured(_) => None,
        MessageData::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value) if value.is_object() => Some(value),
            _ => None,
        },
    }
}

impl Drop for FrameMessenger {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.ready_task.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adweave_core_types::FrameId;
    use segment_store::MemorySegmentStore;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::sleep;

    use crate::transport::InMemoryFrameTransport;

    const ORIGIN: &str = "https://frames.adweave.example";

    fn setup() -> (
        FrameId,
        Arc<InMemoryFrameTransport>,
        Arc<MemorySegmentStore>,
        oneshot::Sender<()>,
        Arc<FrameMessenger>,
    ) {
        let frame = FrameId::new();
        let transport = InMemoryFrameTransport::new();
        let store = Arc::new(MemorySegmentStore::new());
        let (loaded_tx, loaded_rx) = oneshot::channel();
        let messenger = FrameMessenger::start(
            FrameChannel::new(frame.clone(), ORIGIN),
            transport.clone(),
            store.clone(),
            loaded_rx,
        );
        (frame, transport, store, loaded_tx, messenger)
    }

    async fn settle() {
        sleep(Duration::from_millis(30)).await;
    }

    #[tokio::test]
    async fn send_before_ready_delivers_exactly_once_after_load() {
        let (_frame, transport, _store, loaded_tx, messenger) = setup();

        messenger.send("identify", json!("cid-123")).await;
        settle().await;
        assert!(transport.sent().is_empty());

        loaded_tx.send(()).expect("load signal");
        settle().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let (payload, origin) = &sent[0];
        assert_eq!(origin, ORIGIN);
        let parsed: Value = serde_json::from_str(payload).expect("wire json");
        assert_eq!(parsed, json!({"command": "identify", "args": "cid-123"}));
    }

    #[tokio::test]
    async fn queued_commands_flush_in_call_order() {
        let (_frame, transport, _store, loaded_tx, messenger) = setup();

        messenger.send("identify", json!("cid-1")).await;
        messenger.send("consent", json!(true)).await;
        loaded_tx.send(()).expect("load signal");
        settle().await;
        messenger.send("refresh", json!(null)).await;

        let commands: Vec<String> = transport
            .sent()
            .iter()
            .map(|(payload, _)| {
                let parsed: Value = serde_json::from_str(payload).expect("wire json");
                parsed["command"].as_str().expect("command").to_string()
            })
            .collect();
        assert_eq!(commands, vec!["identify", "consent", "refresh"]);
    }

    #[tokio::test]
    async fn segments_from_known_frame_are_persisted() {
        let (frame, transport, store, loaded_tx, messenger) = setup();
        loaded_tx.send(()).expect("load signal");
        settle().await;

        transport.push_inbound(InboundMessage::text(
            frame,
            r#"{"event":"segments","segments":"seg-b"}"#,
        ));
        settle().await;

        assert_eq!(
            store.get(SEGMENTS_KEY).expect("get"),
            Some("seg-b".to_string())
        );
        drop(messenger);
    }

    #[tokio::test]
    async fn structured_payloads_are_accepted_too() {
        let (frame, transport, store, loaded_tx, messenger) = setup();
        loaded_tx.send(()).expect("load signal");
        settle().await;

        transport.push_inbound(InboundMessage::structured(
            frame,
            json!({"event": "segments", "segments": "seg-c"}),
        ));
        settle().await;

        assert_eq!(
            store.get(SEGMENTS_KEY).expect("get"),
            Some("seg-c".to_string())
        );
        drop(messenger);
    }

    #[tokio::test]
    async fn foreign_source_produces_no_store_write() {
        let (_frame, transport, store, loaded_tx, messenger) = setup();
        loaded_tx.send(()).expect("load signal");
        settle().await;

        transport.push_inbound(InboundMessage::text(
            FrameId::new(),
            r#"{"event":"segments","segments":"evil"}"#,
        ));
        settle().await;

        assert_eq!(store.get(SEGMENTS_KEY).expect("get"), None);
        drop(messenger);
    }

    #[tokio::test]
    async fn unparseable_and_unrecognized_messages_are_discarded() {
        let (frame, transport, store, loaded_tx, messenger) = setup();
        loaded_tx.send(()).expect("load signal");
        settle().await;

        transport.push_inbound(InboundMessage::text(frame.clone(), "{not json"));
        transport.push_inbound(InboundMessage::text(
            frame.clone(),
            r#"{"event":"telemetry","segments":"seg-x"}"#,
        ));
        transport.push_inbound(InboundMessage::text(frame, r#"{"segments":"seg-y"}"#));
        settle().await;

        assert_eq!(store.get(SEGMENTS_KEY).expect("get"), None);
        drop(messenger);
    }

    #[tokio::test]
    async fn send_after_close_is_a_noop() {
        let (_frame, transport, _store, loaded_tx, messenger) = setup();
        loaded_tx.send(()).expect("load signal");
        settle().await;

        messenger.send("identify", json!("cid-1")).await;
        messenger.close().await;
        messenger.send("identify", json!("cid-2")).await;
        settle().await;

        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn messages_after_close_are_not_handled() {
        let (frame, transport, store, loaded_tx, messenger) = setup();
        loaded_tx.send(()).expect("load signal");
        settle().await;
        messenger.close().await;

        transport.push_inbound(InboundMessage::text(
            frame,
            r#"{"event":"segments","segments":"late"}"#,
        ));
        settle().await;

        assert_eq!(store.get(SEGMENTS_KEY).expect("get"), None);
    }
}
