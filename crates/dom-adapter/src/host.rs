use async_trait::async_trait;

use adweave_core_types::{ElementId, RootNode};

use crate::error::DomError;

/// Port onto the host document.
///
/// `query_all` returns handles in document order; handles are transient and
/// re-obtained on every scan pass. Attribute access is by name and carries
/// serialized text; interpretation of the value is the caller's concern.
#[async_trait]
pub trait DomHost: Send + Sync {
    async fn query_all(&self, root: &RootNode, selector: &str)
        -> Result<Vec<ElementId>, DomError>;

    async fn get_attribute(
        &self,
        element: &ElementId,
        name: &str,
    ) -> Result<Option<String>, DomError>;

    async fn set_attribute(
        &self,
        element: &ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError>;
}
