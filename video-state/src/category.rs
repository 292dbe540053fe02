//! State categories tracked per player session

use std::fmt;

use serde::{Deserialize, Serialize};

/// One semantic slice of accumulated player state
///
/// Each category is backed by one `StateRecord` in the session's store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Metadata of the ad currently loaded; reset when the ad ends
    Ad,
    /// Playback position of the current ad
    AdTime,
    /// Identity of the current playlist item
    Media,
    /// Playback position and mode of the content
    MediaTime,
    /// Playlist size and current index; cleared when the playlist completes
    Playlist,
    /// Origin of an in-flight seek; cleared when the seek ends
    PendingSeek,
}

impl Category {
    /// Every category, in store order
    pub const ALL: [Category; 6] = [
        Category::Ad,
        Category::AdTime,
        Category::Media,
        Category::MediaTime,
        Category::Playlist,
        Category::PendingSeek,
    ];

    /// Categories initialized when the player reports it is ready
    pub const SESSION: [Category; 4] = [
        Category::Ad,
        Category::AdTime,
        Category::Media,
        Category::MediaTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ad => "AD",
            Category::AdTime => "AD_TIME",
            Category::Media => "MEDIA",
            Category::MediaTime => "MEDIA_TIME",
            Category::Playlist => "PLAYLIST",
            Category::PendingSeek => "PENDING_SEEK",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
