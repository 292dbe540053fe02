use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    #[error("Player version {found} is not supported; minimum is {minimum}")]
    UnsupportedPlayerVersion { found: String, minimum: String },

    #[error("Failed to parse session configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Adapter error: {0}")]
    Adapter(#[from] video_state::AdapterError),

    #[error("Event bus error: {0}")]
    Bus(#[from] video_event_bus::BusError),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
