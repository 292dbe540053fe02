//! # Video Event Bus
//!
//! A synchronous, allow-listed publish/subscribe dispatcher that records every
//! emitted event.
//!
//! ## Overview
//!
//! The bus is built with a fixed catalog of event names. Subscribing or
//! emitting under any other name is logged and ignored, so a typo in an event
//! name shows up in the logs instead of becoming a subscription that never
//! fires.
//!
//! ## Key Features
//!
//! - **Catalog Enforcement**: Unknown event names are rejected with a diagnostic
//! - **Ordered Fan-out**: Subscribers run in registration order
//! - **Failure Isolation**: A panicking subscriber is logged and skipped
//! - **Re-entrancy Safe**: Fan-out iterates a snapshot of the subscriber list
//! - **Event History**: Every accepted emission is recorded with a monotonic timestamp
//!
//! ## Usage
//!
//! ```rust
//! use video_event_bus::EventBus;
//!
//! let bus: EventBus<String> = EventBus::new(["adLoaded", "adError"]);
//!
//! bus.on("adError", |payload| println!("ad error: {payload}")).unwrap();
//! bus.emit("adError", "vast timeout".to_string());
//!
//! for record in bus.history() {
//!     println!("{} -> {}", record.event_name, record.payload);
//! }
//! ```

pub mod bus;
pub mod error;
pub mod record;

// Re-export main types for convenience
pub use bus::{EventBus, Handler, SubscriptionId};
pub use error::{BusError, Result};
pub use record::HistoryRecord;

/// Prelude module for convenient imports
///
/// ```rust
/// use video_event_bus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{BusError, EventBus, Handler, HistoryRecord, Result, SubscriptionId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    proptest! {
        /// History grows by exactly one record per accepted emit, regardless of
        /// how many subscribers exist or how many of them panic
        #[test]
        fn prop_history_matches_accepted_emits(
            names in proptest::collection::vec(
                prop_oneof![Just("adClick"), Just("time"), Just("bogusEvent")],
                0..30,
            ),
            panicking in 0usize..3,
            healthy in 0usize..3,
        ) {
            let bus: EventBus<serde_json::Value> = EventBus::new(["adClick", "time"]);
            let delivered = Arc::new(AtomicUsize::new(0));

            for _ in 0..panicking {
                bus.on("adClick", |_| panic!("subscriber failure")).unwrap();
            }
            for _ in 0..healthy {
                let delivered = Arc::clone(&delivered);
                bus.on("adClick", move |_| {
                    delivered.fetch_add(1, Ordering::SeqCst);
                }).unwrap();
            }

            for name in &names {
                bus.emit(name, serde_json::json!({ "type": name }));
            }

            let accepted = names.iter().filter(|n| **n != "bogusEvent").count();
            let clicks = names.iter().filter(|n| **n == "adClick").count();

            prop_assert_eq!(bus.history_len(), accepted);
            prop_assert_eq!(delivered.load(Ordering::SeqCst), clicks * healthy);

            let recorded: Vec<String> = bus.history().into_iter().map(|r| r.event_name).collect();
            let expected: Vec<String> = names
                .iter()
                .filter(|n| **n != "bogusEvent")
                .map(|n| n.to_string())
                .collect();
            prop_assert_eq!(recorded, expected);
        }
    }
}
