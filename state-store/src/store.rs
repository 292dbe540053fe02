//! Resettable state records and the per-session store that owns them
//!
//! This module provides the two storage primitives:
//! - `StateRecord<F>`: a base snapshot plus a current snapshot for one category
//! - `StateStore<C, F>`: one record per category in a fixed category set

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{Result, StoreError};
use crate::fields::Fields;

// ============================================================================
// StateRecord - base + current snapshot for a single category
// ============================================================================

/// A mutable record holding a reset target (`base`) and a live snapshot (`current`)
///
/// The record starts uninitialized. `initialize` must run before `update`;
/// updating an uninitialized record is an error rather than a silent no-op
/// so ordering bugs between setup and the first event surface immediately.
///
/// # Example
///
/// ```rust
/// use state_store::StateRecord;
/// use std::collections::BTreeMap;
///
/// let mut record: StateRecord<BTreeMap<&str, i64>> = StateRecord::new("ad");
/// assert!(record.update(BTreeMap::from([("offset", 0)])).is_err());
///
/// record.initialize(BTreeMap::from([("skipOffset", 5)]));
/// record.update(BTreeMap::from([("offset", 10)])).unwrap();
/// assert_eq!(record.snapshot().len(), 2);
///
/// record.reset_to_base();
/// assert_eq!(record.snapshot(), BTreeMap::from([("skipOffset", 5)]));
/// ```
#[derive(Clone)]
pub struct StateRecord<F: Fields> {
    label: String,
    base: F,
    current: Option<F>,
}

impl<F: Fields> StateRecord<F> {
    /// Create an uninitialized record
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            base: F::default(),
            current: None,
        }
    }

    /// Set both `base` and `current` to copies of `base`
    pub fn initialize(&mut self, base: F) {
        self.current = Some(base.clone());
        self.base = base;
    }

    /// Shallow-merge `partial` into `current`
    ///
    /// Keys not present in `partial` are left untouched.
    pub fn update(&mut self, partial: F) -> Result<()> {
        match self.current.as_mut() {
            Some(current) => {
                current.merge(partial);
                Ok(())
            }
            None => Err(StoreError::NotInitialized(self.label.clone())),
        }
    }

    /// Defensive copy of `current`; empty when uninitialized or cleared
    pub fn snapshot(&self) -> F {
        self.current.clone().unwrap_or_default()
    }

    /// Borrow `current` without copying
    pub fn current(&self) -> Option<&F> {
        self.current.as_ref()
    }

    /// The reset target set by the last `initialize`
    pub fn base(&self) -> &F {
        &self.base
    }

    /// Replace `current` with a fresh copy of `base`
    ///
    /// Resetting a cleared record leaves it cleared.
    pub fn reset_to_base(&mut self) {
        if self.current.is_some() {
            self.current = Some(self.base.clone());
        }
    }

    /// Drop `current` until the next `initialize`
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Whether `current` is present
    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Label used in diagnostics
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<F: Fields> fmt::Debug for StateRecord<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRecord")
            .field("label", &self.label)
            .field("initialized", &self.is_initialized())
            .field("field_count", &self.current.as_ref().map(|c| c.len()).unwrap_or(0))
            .finish()
    }
}

// ============================================================================
// StateStore<C, F> - one record per category
// ============================================================================

/// A fixed collection of `StateRecord`s, one per category key
///
/// The category set is fixed at construction. Looking up a category that was
/// not registered yields `StoreError::UnknownCategory`.
///
/// # Example
///
/// ```rust
/// use state_store::StateStore;
/// use serde_json::{json, Map, Value};
///
/// let mut store: StateStore<&str> = StateStore::new(["ad", "playlist"]);
///
/// let base: Map<String, Value> = json!({ "skippable": true }).as_object().unwrap().clone();
/// store.initialize(&"ad", base).unwrap();
///
/// let update = json!({ "adTagUrl": "https://ads.example/vast" }).as_object().unwrap().clone();
/// store.update(&"ad", update).unwrap();
/// assert_eq!(store.snapshot(&"ad").unwrap().len(), 2);
///
/// store.reset_category(&"ad").unwrap();
/// assert_eq!(store.snapshot(&"ad").unwrap().len(), 1);
/// ```
pub struct StateStore<C, F = serde_json::Map<String, serde_json::Value>>
where
    C: Copy + Eq + Hash + fmt::Display,
    F: Fields,
{
    records: HashMap<C, StateRecord<F>>,
    order: Vec<C>,
}

impl<C, F> StateStore<C, F>
where
    C: Copy + Eq + Hash + fmt::Display,
    F: Fields,
{
    /// Create a store with one uninitialized record per category
    pub fn new(categories: impl IntoIterator<Item = C>) -> Self {
        let mut records = HashMap::new();
        let mut order = Vec::new();
        for category in categories {
            if records
                .insert(category, StateRecord::new(category.to_string()))
                .is_none()
            {
                order.push(category);
            }
        }

        Self { records, order }
    }

    /// Borrow the record for a category
    pub fn get(&self, category: &C) -> Result<&StateRecord<F>> {
        self.records
            .get(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))
    }

    /// Mutably borrow the record for a category
    pub fn get_mut(&mut self, category: &C) -> Result<&mut StateRecord<F>> {
        self.records
            .get_mut(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))
    }

    /// Initialize a category's record with `base`
    pub fn initialize(&mut self, category: &C, base: F) -> Result<()> {
        self.get_mut(category)?.initialize(base);
        Ok(())
    }

    /// Merge `partial` into a category's current snapshot
    pub fn update(&mut self, category: &C, partial: F) -> Result<()> {
        self.get_mut(category)?.update(partial)
    }

    /// Defensive copy of a category's current snapshot
    pub fn snapshot(&self, category: &C) -> Result<F> {
        Ok(self.get(category)?.snapshot())
    }

    /// Reset a category's record to its base snapshot
    pub fn reset_category(&mut self, category: &C) -> Result<()> {
        tracing::trace!(category = %category, "resetting state record to base");
        self.get_mut(category)?.reset_to_base();
        Ok(())
    }

    /// Clear a category's record
    pub fn clear_category(&mut self, category: &C) -> Result<()> {
        tracing::trace!(category = %category, "clearing state record");
        self.get_mut(category)?.clear();
        Ok(())
    }

    /// Categories in registration order
    pub fn categories(&self) -> &[C] {
        &self.order
    }

    /// Clear every record
    pub fn clear_all(&mut self) {
        for record in self.records.values_mut() {
            record.clear();
        }
    }
}

impl<C, F> fmt::Debug for StateStore<C, F>
where
    C: Copy + Eq + Hash + fmt::Display + fmt::Debug,
    F: Fields,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("categories", &self.order)
            .finish()
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
    fn test_update_before_initialize_fails() {
        let mut record: StateRecord<Map<String, Value>> = StateRecord::new("ad");

        let result = record.update(object(json!({ "adTagUrl": "x" })));
        assert_eq!(result, Err(StoreError::NotInitialized("ad".to_string())));
        assert!(record.snapshot().is_empty());
    }

    #[test]
    fn test_update_merges_and_never_removes() {
        let mut record = StateRecord::new("ad");
        record.initialize(object(json!({ "skippable": true, "skipOffset": 5 })));

        record.update(object(json!({ "adTagUrl": "A" }))).unwrap();
        record.update(object(json!({ "adTitle": "T" }))).unwrap();

        assert_eq!(
            record.snapshot(),
            object(json!({ "skippable": true, "skipOffset": 5, "adTagUrl": "A", "adTitle": "T" }))
        );
    }

    #[test]
    fn test_snapshot_is_defensive_copy() {
        let mut record = StateRecord::new("media");
        record.initialize(object(json!({ "contentId": "c1" })));

        let mut copy = record.snapshot();
        copy.insert("contentId".to_string(), json!("mutated"));

        assert_eq!(record.snapshot(), object(json!({ "contentId": "c1" })));
    }

    #[test]
    fn test_reset_restores_base() {
        let mut record = StateRecord::new("ad");
        record.initialize(object(json!({ "skippable": false })));
        record.update(object(json!({ "skippable": true, "adId": "1" }))).unwrap();

        record.reset_to_base();

        assert_eq!(record.snapshot(), object(json!({ "skippable": false })));
        assert_eq!(record.base(), &object(json!({ "skippable": false })));
    }

    #[test]
    fn test_clear_then_reinitialize() {
        let mut record = StateRecord::new("playlist");
        record.initialize(object(json!({ "playlistItemCount": 3 })));

        record.clear();
        assert!(!record.is_initialized());
        assert!(record.snapshot().is_empty());
        assert!(record.update(object(json!({ "playlistItemIndex": 1 }))).is_err());

        // Reset does not resurrect a cleared record
        record.reset_to_base();
        assert!(!record.is_initialized());

        record.initialize(object(json!({ "playlistItemCount": 1 })));
        assert_eq!(record.snapshot(), object(json!({ "playlistItemCount": 1 })));
    }

    #[test]
    fn test_store_unknown_category() {
        let mut store: StateStore<&str> = StateStore::new(["ad"]);

        assert_eq!(
            store.update(&"media", Map::new()),
            Err(StoreError::UnknownCategory("media".to_string()))
        );
        assert!(store.get(&"ad").is_ok());
    }

    #[test]
    fn test_store_categories_keep_order() {
        let store: StateStore<&str> = StateStore::new(["ad", "media", "ad", "playlist"]);
        assert_eq!(store.categories(), &["ad", "media", "playlist"]);
    }

    #[test]
    fn test_store_reset_and_clear_category() {
        let mut store: StateStore<&str> = StateStore::new(["ad", "seek"]);
        store.initialize(&"ad", object(json!({ "skippable": true }))).unwrap();
        store.initialize(&"seek", object(json!({ "offset": 10 }))).unwrap();
        store.update(&"ad", object(json!({ "adId": "1" }))).unwrap();

        store.reset_category(&"ad").unwrap();
        store.clear_category(&"seek").unwrap();

        assert_eq!(store.snapshot(&"ad").unwrap(), object(json!({ "skippable": true })));
        assert!(!store.get(&"seek").unwrap().is_initialized());

        store.clear_all();
        assert!(!store.get(&"ad").unwrap().is_initialized());
    }
}
