//! Raw-to-canonical event normalization
//!
//! `NormalizationAdapter` owns one session's `StateStore` and interprets the
//! binding table for every raw player event:
//!
//! ```text
//! raw event → writes → payload (fields + enrich + stamp) → sink → resets/clears
//! ```
//!
//! Dispatch is split in two so a caller holding the adapter behind a lock can
//! release it while the payload is delivered: `prepare` applies the state
//! writes and assembles the payload, `finish` applies the post-delivery
//! resets and clears.

use std::collections::HashSet;

use serde_json::Value;
use state_store::{StateStore, StoreError};
use tracing::{debug, trace};

use crate::binding::{binding_for_raw, Binding, Enrich, Lifecycle, Projection, WriteMode};
use crate::category::Category;
use crate::error::{AdapterError, Result};
use crate::event::VideoEvent;
use crate::extract::extract;
use crate::raw::RawEvent;
use crate::sink::EventSink;
use crate::Payload;

/// Session values stamped into or derived for payloads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterContext {
    /// Player container id, stamped on every payload as `divId`
    pub div_id: String,
    /// Version reported by the player
    pub player_version: String,
    /// Configured autostart flag, if any
    pub autostart: Option<bool>,
    /// Base snapshot of the `Ad` category (e.g. skip configuration)
    pub ad_base: Payload,
}

/// A raw event that has been applied to state but not yet finished
#[derive(Debug, Clone)]
pub struct Dispatch {
    binding: &'static Binding,
    payload: Option<Payload>,
}

impl Dispatch {
    /// Canonical event produced
    pub fn event(&self) -> VideoEvent {
        self.binding.event
    }

    /// Assembled payload; `None` when the event is not enabled for delivery
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Take the payload for delivery
    pub fn take_payload(&mut self) -> Option<Payload> {
        self.payload.take()
    }
}

/// Stateful translator from raw player events to canonical payloads
pub struct NormalizationAdapter {
    context: AdapterContext,
    store: StateStore<Category, Payload>,
    enabled: Option<HashSet<VideoEvent>>,
    destroyed: bool,
}

impl NormalizationAdapter {
    /// Create an adapter that delivers every canonical event
    pub fn new(context: AdapterContext) -> Self {
        Self {
            context,
            store: StateStore::new(Category::ALL),
            enabled: None,
            destroyed: false,
        }
    }

    /// Create an adapter that delivers only the listed events
    ///
    /// State is still maintained for every raw event, so enabled events are
    /// enriched the same way regardless of the selection.
    pub fn with_events(context: AdapterContext, events: impl IntoIterator<Item = VideoEvent>) -> Self {
        Self {
            enabled: Some(events.into_iter().collect()),
            ..Self::new(context)
        }
    }

    pub fn context(&self) -> &AdapterContext {
        &self.context
    }

    /// Whether an event is delivered to the sink
    pub fn is_enabled(&self, event: VideoEvent) -> bool {
        self.enabled
            .as_ref()
            .map_or(true, |enabled| enabled.contains(&event))
    }

    /// Apply a raw event's state writes and assemble its payload
    pub fn prepare(&mut self, raw_name: &str, raw: &RawEvent) -> Result<Dispatch> {
        if self.destroyed {
            return Err(AdapterError::Destroyed);
        }

        let binding =
            binding_for_raw(raw_name).ok_or_else(|| AdapterError::UnknownRawEvent(raw_name.to_string()))?;
        debug!(raw = raw_name, event = %binding.event, "Normalizing player event");

        if binding.lifecycle == Lifecycle::Setup {
            self.initialize_session()?;
        }

        let enabled = self.is_enabled(binding.event);
        if enabled {
            self.check_sources(binding)?;
        }

        self.apply_writes(binding, raw)?;

        let payload = if enabled {
            Some(self.assemble(binding, raw)?)
        } else {
            trace!(event = %binding.event, "Event not enabled; skipping payload");
            None
        };

        Ok(Dispatch { binding, payload })
    }

    /// Apply post-delivery resets, clears and teardown
    pub fn finish(&mut self, dispatch: Dispatch) -> Result<()> {
        let binding = dispatch.binding;

        for category in binding.resets {
            self.store.reset_category(category)?;
        }
        for category in binding.clears {
            self.store.clear_category(category)?;
        }

        if binding.lifecycle == Lifecycle::Teardown {
            self.destroy();
        }

        Ok(())
    }

    /// Normalize one raw event and deliver it
    ///
    /// Returns the canonical event produced, whether or not it was delivered.
    pub fn handle(&mut self, raw_name: &str, raw: &RawEvent, sink: &dyn EventSink) -> Result<VideoEvent> {
        let mut dispatch = self.prepare(raw_name, raw)?;
        let event = dispatch.event();

        if let Some(payload) = dispatch.take_payload() {
            sink.deliver(event, payload);
        }

        self.finish(dispatch)?;
        Ok(event)
    }

    /// Copy of a category's current state; empty when not initialized
    pub fn snapshot(&self, category: Category) -> Result<Payload> {
        Ok(self.store.snapshot(&category)?)
    }

    /// Whether a category's state is initialized
    pub fn is_initialized(&self, category: Category) -> bool {
        self.store
            .get(&category)
            .map(|record| record.is_initialized())
            .unwrap_or(false)
    }

    /// Drop all state and reject further raw events
    pub fn destroy(&mut self) {
        if !self.destroyed {
            debug!(div_id = %self.context.div_id, "Destroying normalization adapter");
        }
        self.store.clear_all();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn initialize_session(&mut self) -> Result<()> {
        for category in Category::SESSION {
            let base = match category {
                Category::Ad => self.context.ad_base.clone(),
                _ => Payload::new(),
            };
            self.store.initialize(&category, base)?;
        }
        Ok(())
    }

    /// Fail before any write when a required source would still be absent
    fn check_sources(&self, binding: &Binding) -> Result<()> {
        for source in binding.enrich.iter().filter(|source| source.required) {
            let replaced = binding
                .writes
                .iter()
                .any(|write| write.mode == WriteMode::Replace && write.category == source.category);
            if !replaced && !self.store.get(&source.category)?.is_initialized() {
                return Err(AdapterError::MissingState {
                    event: binding.event,
                    category: source.category,
                });
            }
        }
        Ok(())
    }

    fn apply_writes(&mut self, binding: &Binding, raw: &RawEvent) -> Result<()> {
        // All merge targets are checked first so a failing event writes nothing
        for write in binding.writes {
            if write.mode == WriteMode::Merge && !self.store.get(&write.category)?.is_initialized() {
                return Err(StoreError::NotInitialized(write.category.to_string()).into());
            }
        }

        for write in binding.writes {
            let fields = extract(write.fields, raw, &self.context);
            match write.mode {
                WriteMode::Merge => self.store.update(&write.category, fields)?,
                WriteMode::Replace => self.store.initialize(&write.category, fields)?,
            }
        }

        Ok(())
    }

    fn assemble(&self, binding: &Binding, raw: &RawEvent) -> Result<Payload> {
        let mut payload = extract(binding.fields, raw, &self.context);

        for source in binding.enrich {
            self.enrich(binding.event, source, &mut payload)?;
        }

        payload.insert("divId".to_string(), Value::from(self.context.div_id.clone()));
        payload.insert("type".to_string(), Value::from(binding.event.as_str()));
        Ok(payload)
    }

    fn enrich(&self, event: VideoEvent, source: &Enrich, payload: &mut Payload) -> Result<()> {
        let Some(state) = self.store.get(&source.category)?.current() else {
            if source.required {
                return Err(AdapterError::MissingState {
                    event,
                    category: source.category,
                });
            }
            return Ok(());
        };

        match source.projection {
            Projection::All => {
                for (key, value) in state {
                    payload.insert(key.clone(), value.clone());
                }
            }
            Projection::Keys(keys) => {
                for (out_key, state_key) in keys {
                    if let Some(value) = state.get(*state_key) {
                        payload.insert(out_key.to_string(), value.clone());
                    }
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for NormalizationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizationAdapter")
            .field("div_id", &self.context.div_id)
            .field("enabled", &self.enabled.as_ref().map(|e| e.len()))
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
