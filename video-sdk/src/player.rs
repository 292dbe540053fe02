//! Interface to the host video player

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use video_state::RawEvent;

/// Listener invoked with each raw event's data object
pub type RawHandler = Arc<dyn Fn(&RawEvent) + Send + Sync>;

/// Handle for one registered raw-event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// The video player a session attaches to
///
/// Implementations wrap a concrete player instance. Listeners may be invoked
/// from whatever thread the player delivers events on, one event at a time.
pub trait Player: Send + Sync {
    /// Version string reported by the player (e.g. `"8.26.0"`)
    fn version(&self) -> String;

    /// Whether the player has already been set up by the host page
    fn is_setup(&self) -> bool;

    /// Set up the player with a setup object
    fn setup(&self, config: &Map<String, Value>);

    /// Register a listener for a raw event name
    fn on(&self, raw_event: &str, handler: RawHandler) -> ListenerId;

    /// Remove a previously registered listener
    fn off(&self, raw_event: &str, id: ListenerId);

    /// Play an ad from a VAST tag URL or inline VAST XML
    fn play_ad(&self, tag: &str);
}
