//! Fields trait for mergeable state snapshots
//!
//! A `StateRecord` stores its base and current snapshots as some mapping
//! type. The only behavior the record needs from that mapping is a shallow
//! merge, so any map-like type can be plugged in.
//!
//! # Example
//!
//! ```rust
//! use state_store::Fields;
//! use std::collections::BTreeMap;
//!
//! let mut current: BTreeMap<&str, i32> = BTreeMap::from([("position", 1)]);
//! current.merge(BTreeMap::from([("position", 5), ("duration", 30)]));
//!
//! assert_eq!(current.get("position"), Some(&5));
//! assert_eq!(current.len(), 2);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Mapping of named fields that can be shallow-merged
///
/// Implementations must:
/// - Clone: snapshots are handed out as defensive copies
/// - Default: an absent or cleared record reads as the empty mapping
/// - merge: add or overwrite every key of `other`, leaving the rest untouched
pub trait Fields: Clone + Default {
    /// Shallow-merge `other` into `self`; later values win on key collision
    fn merge(&mut self, other: Self);

    /// Number of fields present
    fn len(&self) -> usize;

    /// Whether no fields are present
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Fields for serde_json::Map<String, serde_json::Value> {
    fn merge(&mut self, other: Self) {
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    fn len(&self) -> usize {
        serde_json::Map::len(self)
    }
}

impl<K, V> Fields for HashMap<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    fn merge(&mut self, other: Self) {
        self.extend(other);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K, V> Fields for BTreeMap<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn merge(&mut self, other: Self) {
        self.extend(other);
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_json_merge_overwrites_and_keeps() {
        let mut current = object(json!({ "tag": "A", "position": 1 }));
        current.merge(object(json!({ "position": 5, "duration": 30 })));

        assert_eq!(current, object(json!({ "tag": "A", "position": 5, "duration": 30 })));
    }

    #[test]
    fn test_empty_merge_is_noop() {
        let mut current: HashMap<String, u32> = HashMap::from([("a".to_string(), 1)]);
        current.merge(HashMap::new());

        assert_eq!(current.len(), 1);
        assert!(!current.is_empty());
    }
}
