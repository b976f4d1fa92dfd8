//! Recursive override merge for nested configuration trees.

use serde_json::{Map, Value};

/// Merge `overlay` over `base`, returning a new tree.
///
/// Keys whose values are objects on both sides recurse; every other conflict
/// is resolved by replacing the base value wholesale (arrays included). Keys
/// present only in `base` are preserved. Neither input is mutated, and `Null`
/// on either side behaves as the empty tree.
#[must_use]
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let combined = match (merged.get(key), overlay_value) {
                    (Some(existing @ Value::Object(_)), Value::Object(_)) => {
                        deep_merge(existing, overlay_value)
                    }
                    _ => overlay_value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Object(merged)
        }
        (Value::Null, Value::Null) => empty_tree(),
        (base, Value::Null) => base.clone(),
        (_, overlay) => overlay.clone(),
    }
}

/// The empty configuration tree.
#[must_use]
pub fn empty_tree() -> Value {
    Value::Object(Map::new())
}
