//! Error types for video-state

use state_store::StoreError;
use thiserror::Error;

use crate::category::Category;
use crate::event::VideoEvent;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while normalizing a single raw player event
///
/// Every variant fails only the event being processed; the adapter stays
/// usable for the next one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// The session was torn down; raw events are no longer processed
    #[error("Adapter has been destroyed")]
    Destroyed,

    /// No binding listens to this raw player event
    #[error("No binding for raw player event '{0}'")]
    UnknownRawEvent(String),

    /// A state source the event cannot be built without is absent
    #[error("Event '{event}' requires {category} state, which is not initialized")]
    MissingState { event: VideoEvent, category: Category },

    /// State record access failed
    #[error("State error: {0}")]
    State(#[from] StoreError),
}
