//! # Video SDK - Normalized Player Events
//!
//! Attaches to a video player and republishes its raw, inconsistent event
//! stream as a stable catalog of canonical events with enriched payloads:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use video_sdk::{SessionConfig, VideoEvent, VideoSession};
//!
//! fn main() -> Result<(), video_sdk::SdkError> {
//!     let config = SessionConfig::from_json(r#"{ "divId": "player", "autostart": true }"#)?;
//!     let session = VideoSession::new(config, Arc::new(MyPlayer::new()))?;
//!
//!     session.subscribe(VideoEvent::AdError, |payload| {
//!         // Carries the ad metadata captured at adLoaded and the last ad time
//!         println!("ad error: {:?}", payload);
//!     })?;
//!
//!     session.destroy();
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Canonical events**: consumers see `VideoEvent` names, never raw player names
//! - **Enriched payloads**: ad, media and playlist context is merged in automatically
//! - **Allow-listed bus**: subscribing to an unknown event name is rejected
//! - **Failure isolation**: a panicking subscriber does not affect the others
//!
//! ## Architecture
//!
//! ```text
//! video-sdk (VideoSession, Player)
//!     ↓
//! video-state (NormalizationAdapter, bindings)
//!     ↓                    ↓
//! state-store          video-event-bus
//! ```

pub use config::{is_supported_version, SessionConfig, SessionParams, MIN_PLAYER_VERSION};
pub use error::{Result, SdkError};
pub use player::{ListenerId, Player, RawHandler};
pub use session::VideoSession;

// Re-export commonly used types from the lower crates
pub use video_event_bus::{BusError, EventBus, HistoryRecord, SubscriptionId};
pub use video_state::{
    logging, AdapterError, Category, Payload, PlaybackMode, RawEvent, VideoEvent,
};

mod config;
mod error;
mod player;
mod session;
