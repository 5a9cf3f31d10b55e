use tracing::warn;

use adweave_core_types::{ElementId, RootNode};
use dom_adapter::DomHost;

/// Return the ad elements currently under `root`, in document order.
///
/// Never fails: a host query error degrades to an empty result and the
/// next scan pass simply tries again.
pub async fn find_ads(host: &dyn DomHost, root: &RootNode, selector: &str) -> Vec<ElementId> {
    match host.query_all(root, selector).await {
        Ok(elements) => elements,
        Err(err) => {
            warn!(target: "ad-rewriter", %root, %err, "ad query failed, treating as empty");
            Vec::new()
        }
    }
}
