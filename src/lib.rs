//! AdWeave: an embeddable ad-targeting page component.
//!
//! The element wires the member crates into the host's lifecycle: on
//! creation it seeds a targeting patch from persisted segments and starts
//! the scan-and-patch cycle, on attach it opens the vendor frame channel
//! and identifies the visitor, on detach it tears both down. The host
//! supplies the seams (DOM access, frame creation, durable storage); every
//! failure behind those seams is absorbed so ad rendering is never broken
//! by a missing targeting value.

pub mod client_id;
pub mod config;
pub mod element;
pub mod ports;

pub use client_id::{StoredClientId, CLIENT_ID_KEY};
pub use config::ElementConfig;
pub use element::{AdWeaveElement, ElementLifecycle, ElementMetrics};
pub use ports::{ClientIdProvider, FrameLoader, LoadedFrame};

pub use ad_rewriter::{RewriterConfig, ScanCycle};
pub use adweave_core_types::{ElementId, FrameId, RootNode, TargetingPatch, WeaveError};
pub use adweave_event_bus::{dom_event_bus, DomEventBus, DomSignal};
pub use dom_adapter::{DomHost, InMemoryDom};
pub use frame_bridge::{BridgeConfig, FrameChannel, FrameMessenger, FrameTransport};
pub use segment_store::{
    FileSegmentStore, MemorySegmentStore, SegmentStore, StoreConfig, SEGMENTS_KEY,
};
