//! Field-by-field merging of YAML configuration tiers.
//!
//! Tiers are parsed into `serde_json::Value` and folded together; later tiers
//! win. Maps merge key by key, everything else is replaced, and an explicit
//! `null` leaves the lower tier untouched.

use serde_json::Value;

/// Merge `overlay` on top of `base` and return the result.
///
/// ```
/// use serde_json::json;
/// use todo_server::config::deep_merge;
///
/// let base = json!({"server": {"host": "127.0.0.1", "port": 5000}});
/// let overlay = json!({"server": {"port": 8080}});
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"server": {"host": "127.0.0.1", "port": 8080}})
/// );
/// ```
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

/// Fold every tier into one value, lowest priority first.
pub fn deep_merge_all(tiers: impl IntoIterator<Item = Value>) -> Value {
    tiers.into_iter().fold(Value::Null, deep_merge)
}

fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_merge_individually() {
        let merged = deep_merge(
            json!({"server": {"db_path": "todo.db", "port": 5000}}),
            json!({"server": {"port": 9000}}),
        );
        assert_eq!(merged, json!({"server": {"db_path": "todo.db", "port": 9000}}));
    }

    #[test]
    fn null_overlay_keeps_base() {
        let merged = deep_merge(json!({"server": {"port": 5000}}), json!({"server": null}));
        assert_eq!(merged, json!({"server": {"port": 5000}}));
    }

    #[test]
    fn scalars_and_arrays_are_replaced() {
        let merged = deep_merge(json!({"a": [1, 2], "b": "x"}), json!({"a": [3], "b": 4}));
        assert_eq!(merged, json!({"a": [3], "b": 4}));
    }

    #[test]
    fn merge_all_respects_tier_order() {
        let merged = deep_merge_all(vec![
            json!({"port": 1, "host": "a"}),
            json!({"port": 2}),
            json!({"port": 3}),
        ]);
        assert_eq!(merged, json!({"port": 3, "host": "a"}));
    }
}
