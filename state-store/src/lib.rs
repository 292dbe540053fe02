//! Generic State Records
//!
//! Small resettable state containers keyed by category, used to accumulate
//! context across a stream of events and hand out snapshots of it.
//!
//! # Features
//!
//! - **Base + Current**: Each record keeps a reset target and a live snapshot
//! - **Merge Updates**: Updates only add or overwrite keys, never remove them
//! - **Strict Initialization**: Updating an uninitialized record is an error
//! - **Generic Fields**: Any map-like type implementing `Fields` can be stored
//! - **Generic Categories**: Use any small `Copy` key (typically an enum)
//!
//! # Quick Start
//!
//! ```rust
//! use state_store::StateStore;
//! use std::collections::BTreeMap;
//!
//! let mut store: StateStore<&str, BTreeMap<String, i64>> = StateStore::new(["ad_time"]);
//!
//! store.initialize(&"ad_time", BTreeMap::new()).unwrap();
//! store
//!     .update(&"ad_time", BTreeMap::from([("adCurrentTime".to_string(), 5)]))
//!     .unwrap();
//!
//! let snapshot = store.snapshot(&"ad_time").unwrap();
//! assert_eq!(snapshot.get("adCurrentTime"), Some(&5));
//! ```
//!
//! # Architecture
//!
//! ```text
//! StateStore<C, F>
//!     │
//!     └── records: HashMap<C, StateRecord<F>>
//!             │
//!             ├── base: F            (reset target)
//!             └── current: Option<F> (None until initialized / after clear)
//! ```

// Modules
pub mod error;
pub mod fields;
pub mod store;

// Re-exports - Public API
pub use error::{Result, StoreError};
pub use fields::Fields;
pub use store::{StateRecord, StateStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::StoreError;
    pub use crate::fields::Fields;
    pub use crate::store::{StateRecord, StateStore};
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Category {
        Ad,
        AdTime,
    }

    impl std::fmt::Display for Category {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Category::Ad => write!(f, "ad"),
                Category::AdTime => write!(f, "ad_time"),
            }
        }
    }

    #[test]
    fn test_full_episode_workflow() {
        let mut store: StateStore<Category, BTreeMap<String, String>> =
            StateStore::new([Category::Ad, Category::AdTime]);

        store
            .initialize(&Category::Ad, BTreeMap::from([("skippable".into(), "true".into())]))
            .unwrap();
        store.initialize(&Category::AdTime, BTreeMap::new()).unwrap();

        // Episode accumulates
        store
            .update(&Category::Ad, BTreeMap::from([("adTagUrl".into(), "A".into())]))
            .unwrap();
        store
            .update(&Category::AdTime, BTreeMap::from([("adCurrentTime".into(), "5".into())]))
            .unwrap();
        assert_eq!(store.snapshot(&Category::Ad).unwrap().len(), 2);

        // Episode ends
        store.reset_category(&Category::Ad).unwrap();
        store.reset_category(&Category::AdTime).unwrap();

        assert_eq!(
            store.snapshot(&Category::Ad).unwrap(),
            BTreeMap::from([("skippable".to_string(), "true".to_string())])
        );
        assert!(store.snapshot(&Category::AdTime).unwrap().is_empty());
    }

    #[test]
    fn test_error_names_category() {
        let mut store: StateStore<Category, BTreeMap<String, String>> =
            StateStore::new([Category::Ad, Category::AdTime]);

        let err = store.update(&Category::AdTime, BTreeMap::new()).unwrap_err();
        assert_eq!(err, StoreError::NotInitialized("ad_time".to_string()));
    }

    proptest! {
        /// Merge-updates never remove a key that was previously present
        #[test]
        fn prop_update_never_removes_keys(
            base in proptest::collection::btree_map("[a-z]{1,4}", 0i64..100, 0..6),
            updates in proptest::collection::vec(
                proptest::collection::btree_map("[a-z]{1,4}", 0i64..100, 0..6),
                0..5,
            ),
        ) {
            let mut record = StateRecord::new("prop");
            record.initialize(base.clone());

            let mut seen: Vec<String> = base.keys().cloned().collect();
            for update in updates {
                seen.extend(update.keys().cloned());
                record.update(update.clone()).unwrap();

                let snapshot = record.snapshot();
                for key in &seen {
                    prop_assert!(snapshot.contains_key(key));
                }
                for (key, value) in &update {
                    prop_assert_eq!(snapshot.get(key), Some(value));
                }
            }

            record.reset_to_base();
            prop_assert_eq!(record.snapshot(), base);
        }
    }
}
