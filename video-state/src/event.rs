//! Canonical video event catalog
//!
//! These are the consumer-facing event names. Each payload carries its
//! canonical name under `type`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! video_events {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A canonical, consumer-facing video event
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum VideoEvent {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl VideoEvent {
            /// Every canonical event, in catalog order
            pub const ALL: &'static [VideoEvent] = &[$(VideoEvent::$variant),+];

            /// Canonical wire name (e.g. `"adImpression"`)
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(VideoEvent::$variant => $name,)+
                }
            }
        }

        impl FromStr for VideoEvent {
            type Err = UnknownVideoEvent;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(VideoEvent::$variant),)+
                    _ => Err(UnknownVideoEvent(s.to_string())),
                }
            }
        }
    };
}

video_events! {
    // Setup lifecycle
    SetupComplete => "setupComplete",
    SetupFailed => "setupFailed",
    Destroyed => "destroyed",

    // Ad lifecycle
    AdRequest => "adRequest",
    AdBreakStart => "adBreakStart",
    AdLoaded => "adLoaded",
    AdStarted => "adStarted",
    AdImpression => "adImpression",
    AdPlay => "adPlay",
    AdPause => "adPause",
    AdTime => "adTime",
    AdClick => "adClick",
    AdSkipped => "adSkipped",
    AdError => "adError",
    AdComplete => "adComplete",
    AdBreakEnd => "adBreakEnd",

    // Content and playlist
    Playlist => "playlist",
    PlaybackRequest => "playbackRequest",
    AutostartBlocked => "autostartBlocked",
    PlayAttemptFailed => "playAttemptFailed",
    ContentLoaded => "contentLoaded",
    Play => "play",
    Pause => "pause",
    Buffer => "buffer",
    Time => "time",
    SeekStart => "seekStart",
    SeekEnd => "seekEnd",
    Mute => "mute",
    Volume => "volume",
    RenditionUpdate => "renditionUpdate",
    Error => "error",
    Complete => "complete",
    PlaylistComplete => "playlistComplete",

    // UI and viewability
    Fullscreen => "fullscreen",
    PlayerResize => "playerResize",
    Viewable => "viewable",
}

impl VideoEvent {
    /// Canonical names of every event, for building an event bus catalog
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(VideoEvent::as_str)
    }

    /// Whether this event belongs to the ad lifecycle
    pub fn is_ad_event(&self) -> bool {
        self.as_str().starts_with("ad")
    }
}

impl fmt::Display for VideoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a name that is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown video event '{0}'")]
pub struct UnknownVideoEvent(pub String);
