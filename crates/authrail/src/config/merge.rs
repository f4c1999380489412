//! Deep merging of partial configuration over defaults.

use serde_json::Value;

/// Deep merge two JSON values (`source` takes precedence for conflicts).
///
/// Objects are merged key by key; a key missing from `target` receives the
/// source value whole. Any other combination replaces the target value.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                if let Some(target_value) = target_map.get_mut(&key) {
                    deep_merge(target_value, source_value);
                } else {
                    target_map.insert(key, source_value);
                }
            }
        }
        (target, source) => {
            *target = source;
        }
    }
}

/// Merges an optional partial over `defaults` and returns the result.
///
/// An absent partial returns the defaults unchanged.
#[must_use]
pub fn merge_partial(mut defaults: Value, partial: Option<Value>) -> Value {
    if let Some(partial) = partial {
        deep_merge(&mut defaults, partial);
    }
    defaults
}
