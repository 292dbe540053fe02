//! Video Player Event Normalization
//!
//! Translates a video player's raw event stream into a stable catalog of
//! canonical events whose payloads combine the raw event's own fields with
//! state accumulated from earlier events.
//!
//! # Features
//!
//! - **Canonical Catalog**: `VideoEvent` names every event consumers can see
//! - **Declarative Bindings**: One table row per event drives extraction,
//!   state writes, enrichment and post-delivery resets
//! - **Session State**: Ad, ad-time, media, media-time, playlist and
//!   pending-seek records backed by `state_store`
//! - **Pluggable Delivery**: Any `EventSink`, including `video_event_bus::EventBus`
//!
//! # Architecture
//!
//! ```text
//! Player → RawEvent → NormalizationAdapter → EventSink
//!                          │
//!                          └── StateStore<Category, Payload>
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use video_state::{AdapterContext, CallbackSink, NormalizationAdapter, RawEvent};
//!
//! let context = AdapterContext {
//!     div_id: "player".to_string(),
//!     player_version: "8.26.0".to_string(),
//!     ..Default::default()
//! };
//! let mut adapter = NormalizationAdapter::new(context);
//! let sink = CallbackSink::new(|event, payload: &video_state::Payload| {
//!     println!("{event}: {payload:?}");
//! });
//!
//! adapter.handle("ready", &RawEvent::empty(), &sink).unwrap();
//! adapter
//!     .handle("volume", &RawEvent::from(json!({ "volume": 30 })), &sink)
//!     .unwrap();
//! ```

pub mod adapter;
pub mod binding;
pub mod category;
pub mod error;
pub mod event;
pub mod extract;
pub mod logging;
pub mod raw;
pub mod sink;

/// Canonical event payload
pub type Payload = serde_json::Map<String, serde_json::Value>;

pub use adapter::{AdapterContext, Dispatch, NormalizationAdapter};
pub use binding::{binding_for_event, binding_for_raw, raw_event_names, Binding, BINDINGS};
pub use category::Category;
pub use error::{AdapterError, Result};
pub use event::{UnknownVideoEvent, VideoEvent};
pub use extract::PlaybackMode;
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use raw::RawEvent;
pub use sink::{CallbackSink, EventSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AdapterContext, AdapterError, Category, EventSink, NormalizationAdapter, Payload, RawEvent,
        VideoEvent,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use video_event_bus::EventBus;

    fn ready_adapter() -> NormalizationAdapter {
        let mut adapter = NormalizationAdapter::new(AdapterContext {
            div_id: "p".to_string(),
            ..Default::default()
        });
        let bus: EventBus<Payload> = EventBus::new(VideoEvent::names());
        adapter.handle("ready", &RawEvent::empty(), &bus).unwrap();
        adapter
    }

    #[test]
    fn test_adapter_drives_event_bus() {
        let bus: EventBus<Payload> = EventBus::new(VideoEvent::names());
        let mut adapter = ready_adapter();

        adapter
            .handle("mute", &RawEvent::from(json!({ "mute": true })), &bus)
            .unwrap();

        let history = bus.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_name, "mute");
        assert_eq!(history[0].payload.get("type"), Some(&json!("mute")));
    }

    proptest! {
        #[test]
        fn prop_every_payload_is_stamped(volume in 0u32..=100, width in 1u32..4000, height in 1u32..4000) {
            let mut adapter = ready_adapter();
            let seen = std::cell::RefCell::new(Vec::new());
            let sink = CallbackSink::new(|_, payload: &Payload| seen.borrow_mut().push(payload.clone()));

            adapter.handle("volume", &RawEvent::from(json!({ "volume": volume })), &sink).unwrap();
            adapter.handle("resize", &RawEvent::from(json!({ "width": width, "height": height })), &sink).unwrap();
            adapter.handle("play", &RawEvent::empty(), &sink).unwrap();

            for payload in seen.borrow().iter() {
                prop_assert_eq!(payload.get("divId"), Some(&Value::from("p")));
                prop_assert!(payload.get("type").and_then(Value::as_str).is_some());
            }
        }

        #[test]
        fn prop_ad_reset_restores_base(position in 0.0f64..60.0, title in "[a-z]{1,12}") {
            let mut adapter = ready_adapter();
            let sink = CallbackSink::new(|_, _: &Payload| {});
            let base = adapter.snapshot(Category::Ad).unwrap();

            adapter.handle("adLoaded", &RawEvent::from(json!({ "adtitle": title })), &sink).unwrap();
            adapter.handle("adTime", &RawEvent::from(json!({ "position": position })), &sink).unwrap();
            adapter.handle("adComplete", &RawEvent::empty(), &sink).unwrap();

            prop_assert_eq!(adapter.snapshot(Category::Ad).unwrap(), base);
            prop_assert!(adapter.snapshot(Category::AdTime).unwrap().is_empty());
        }
    }
}
