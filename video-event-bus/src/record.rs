//! History records for dispatched events
//!
//! Every event that passes the catalog check is appended to the bus history
//! as a `HistoryRecord`, whether or not anyone is subscribed to it.

use std::time::{Duration, Instant};

/// One dispatched event as recorded in the bus history
#[derive(Debug, Clone)]
pub struct HistoryRecord<P> {
    /// Name the event was emitted under
    pub event_name: String,

    /// Payload the event was emitted with
    pub payload: P,

    /// Monotonic time of dispatch
    pub timestamp: Instant,
}

impl<P> HistoryRecord<P> {
    /// Create a new record stamped with the current time
    pub fn new(event_name: impl Into<String>, payload: P) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
            timestamp: Instant::now(),
        }
    }

    /// Time elapsed between `origin` and this record's dispatch
    pub fn elapsed_since(&self, origin: Instant) -> Duration {
        self.timestamp.saturating_duration_since(origin)
    }
}

impl<P: PartialEq> PartialEq for HistoryRecord<P> {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.event_name == other.event_name && self.payload == other.payload
    }
}
