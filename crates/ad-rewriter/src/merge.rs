use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use adweave_core_types::{ElementId, TargetingPatch};
use dom_adapter::DomHost;

use crate::errors::RewriteError;
use crate::events;

/// Merge one targeting key/value pair into a serialized configuration
/// attribute.
///
/// Absent, empty, or unparseable input starts from an empty object; a
/// non-object `targeting` member is replaced by a fresh map. Every other
/// key, top-level or nested, is preserved verbatim. Applying the same pair
/// twice yields the same output as applying it once.
pub fn merge(raw: Option<&str>, key: &str, value: &str) -> Result<String, RewriteError> {
    let mut root = parse_object(raw);

    let targeting = root
        .entry("targeting".to_string())
        .or_insert_with(|| Value::Object(JsonMap::new()));
    if !targeting.is_object() {
        *targeting = Value::Object(JsonMap::new());
    }
    if let Value::Object(map) = targeting {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }

    serde_json::to_string(&Value::Object(root))
        .map_err(|err| RewriteError::Serialize(err.to_string()))
}

/// Read-merge-write adapter between the pure merge and one element.
///
/// Returns whether the element was rewritten. Any failure leaves the
/// element unmodified and is absorbed here; the scan pass moves on to the
/// next element.
pub async fn apply_patch(
    host: &dyn DomHost,
    element: &ElementId,
    config_attr: &str,
    patch: &TargetingPatch,
) -> bool {
    let result = try_apply(host, element, config_attr, patch).await;
    match result {
        Ok(()) => true,
        Err(err) => {
            events::emit_patch_skipped(element, &err);
            false
        }
    }
}

async fn try_apply(
    host: &dyn DomHost,
    element: &ElementId,
    config_attr: &str,
    patch: &TargetingPatch,
) -> Result<(), RewriteError> {
    let raw = host
        .get_attribute(element, config_attr)
        .await
        .map_err(|err| RewriteError::Dom(err.to_string()))?;
    let merged = merge(raw.as_deref(), &patch.key, &patch.value)?;
    host.set_attribute(element, config_attr, &merged)
        .await
        .map_err(|err| RewriteError::Dom(err.to_string()))?;
    debug!(target: "ad-rewriter", element = %element.0, patch = %patch, "targeting applied");
    Ok(())
}

fn parse_object(raw: Option<&str>) -> JsonMap<String, Value> {
    let text = match raw {
        Some(text) if !text.trim().is_empty() => text,
        _ => return JsonMap::new(),
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        _ => JsonMap::new(),
    }
}
