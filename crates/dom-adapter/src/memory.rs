use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use adweave_core_types::{ElementId, RootNode};
use adweave_event_bus::{DomEventBus, DomSignal, EventBus};

use crate::error::DomError;
use crate::host::DomHost;

#[derive(Clone, Debug)]
struct NodeRecord {
    tag: String,
    attributes: BTreeMap<String, String>,
    scope: RootNode,
}

/// Document-ordered element tree with flat shadow subtrees.
///
/// Appending an element publishes a [`DomSignal::Updated`] for the affected
/// root when a bus is attached. Attribute writes do not signal: the scan
/// pass itself rewrites attributes, and signalling those writes would feed
/// the cycle its own output.
pub struct InMemoryDom {
    nodes: DashMap<ElementId, NodeRecord>,
    order: Mutex<Vec<ElementId>>,
    bus: Option<DomEventBus>,
}

impl InMemoryDom {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: DashMap::new(),
            order: Mutex::new(Vec::new()),
            bus: None,
        })
    }

    pub fn with_bus(bus: DomEventBus) -> Arc<Self> {
        Arc::new(Self {
            nodes: DashMap::new(),
            order: Mutex::new(Vec::new()),
            bus: Some(bus),
        })
    }

    pub async fn append_element(&self, scope: RootNode, tag: &str) -> ElementId {
        self.append_element_with_attrs(scope, tag, &[]).await
    }

    pub async fn append_element_with_attrs(
        &self,
        scope: RootNode,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> ElementId {
        let id = ElementId::new();
        let attributes = attrs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.nodes.insert(
            id.clone(),
            NodeRecord {
                tag: tag.to_ascii_lowercase(),
                attributes,
                scope: scope.clone(),
            },
        );
        self.order.lock().push(id.clone());
        self.signal_update(scope).await;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    async fn signal_update(&self, root: RootNode) {
        let Some(bus) = &self.bus else {
            return;
        };
        if let Err(err) = bus.publish(DomSignal::Updated { root }).await {
            // Nobody listening yet; the initial scan covers this window.
            debug!(target: "dom-adapter", ?err, "dom update signal had no subscribers");
        }
    }
}

#[async_trait]
impl DomHost for InMemoryDom {
    async fn query_all(
        &self,
        root: &RootNode,
        selector: &str,
    ) -> Result<Vec<ElementId>, DomError> {
        let wanted = selector.to_ascii_lowercase();
        let order = self.order.lock();
        let matches = order
            .iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .map(|node| node.scope == *root && node.tag == wanted)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn get_attribute(
        &self,
        element: &ElementId,
        name: &str,
    ) -> Result<Option<String>, DomError> {
        let node = self
            .nodes
            .get(element)
            .ok_or_else(|| DomError::NodeNotFound(element.0.clone()))?;
        Ok(node.attributes.get(name).cloned())
    }

    async fn set_attribute(
        &self,
        element: &ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let mut node = self
            .nodes
            .get_mut(element)
            .ok_or_else(|| DomError::NodeNotFound(element.0.clone()))?;
        node.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
