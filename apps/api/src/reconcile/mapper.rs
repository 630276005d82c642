//! Field Mapper: renames synonym keys to canonical keys, for flat objects and
//! for each entry of a nested sequence.
//!
//! Iteration order is the insertion order of the source object (serde_json is
//! built with `preserve_order`). When two source keys land on the same canonical
//! key, the later one wins unless the caller supplies a merge policy.

use serde_json::{Map, Value};
use tracing::trace;

use crate::reconcile::synonyms::SynonymTable;

/// Renames every key the table recognizes. Unmapped keys pass through with their
/// original value; keys that cannot be looked up (empty, numeric, "null") are kept as-is.
pub fn map_fields(source: &Map<String, Value>, table: &SynonymTable) -> Map<String, Value> {
    map_fields_with(source, table, |_, _existing, incoming| incoming)
}

/// Same as [`map_fields`], but a collision on a canonical key is resolved by
/// `merge(canonical_key, existing, incoming)`.
pub fn map_fields_with<F>(
    source: &Map<String, Value>,
    table: &SynonymTable,
    mut merge: F,
) -> Map<String, Value>
where
    F: FnMut(&str, Value, Value) -> Value,
{
    let mut mapped = Map::with_capacity(source.len());

    for (key, value) in source {
        let Some(canonical) = table.lookup(key) else {
            mapped.insert(key.clone(), value.clone());
            continue;
        };

        if key != canonical {
            trace!(table = table.name, from = %key, to = canonical, "mapped synonym");
        }

        let resolved = match mapped.get_mut(canonical) {
            Some(existing) => merge(canonical, existing.take(), value.clone()),
            None => value.clone(),
        };
        mapped.insert(canonical.to_string(), resolved);
    }

    mapped
}

/// Applies `f` to every object element of a sequence. Non-object elements are kept
/// unmodified. A lone object is treated as a one-element sequence; any other value
/// is returned unchanged.
pub fn map_each_entry<F>(value: &Value, mut f: F) -> Value
where
    F: FnMut(&Map<String, Value>) -> Map<String, Value>,
{
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(entry) => Value::Object(f(entry)),
                    other => other.clone(),
                })
                .collect(),
        ),
        Value::Object(entry) => Value::Array(vec![Value::Object(f(entry))]),
        other => other.clone(),
    }
}

/// Maps each entry of a sequence with an entity-scoped table.
pub fn map_entries(value: &Value, table: &SynonymTable) -> Value {
    map_each_entry(value, |entry| map_fields(entry, table))
}
