use thiserror::Error;

/// Errors that can occur in the event bus
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Event name is not part of the bus catalog
    #[error("Unknown event name '{name}'; valid event names: {valid}")]
    UnknownEvent { name: String, valid: String },
}

/// Result type for event bus operations
pub type Result<T> = std::result::Result<T, BusError>;
