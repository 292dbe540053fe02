//! Raw-event bindings
//!
//! One row per canonical event: which raw player event drives it, which
//! fields it reports, which state it writes, which state it reads, and which
//! state it resets or clears once the payload has been delivered. The rows
//! are interpreted by `NormalizationAdapter`; no event has its own handler.

use crate::category::Category;
use crate::event::VideoEvent;
use crate::extract::{Field, Source};

/// Session lifecycle effect of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No lifecycle effect
    None,
    /// Initialize the session categories before anything else
    Setup,
    /// Mark the adapter destroyed after delivery
    Teardown,
}

/// How a state write is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Merge into the current snapshot; the record must be initialized
    Merge,
    /// Re-initialize the record with the extracted fields as its new base
    Replace,
}

/// Fields written to one state category
#[derive(Debug, Clone, Copy)]
pub struct StateWrite {
    pub category: Category,
    pub mode: WriteMode,
    pub fields: &'static [Field],
}

/// Which keys of a state snapshot end up in the payload
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    /// The whole snapshot
    All,
    /// Selected keys, as `(payload key, state key)` pairs
    Keys(&'static [(&'static str, &'static str)]),
}

/// State merged into the payload
#[derive(Debug, Clone, Copy)]
pub struct Enrich {
    pub category: Category,
    pub projection: Projection,
    /// Fail the event when the category is not initialized
    pub required: bool,
}

/// One canonical event and how to build it
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub event: VideoEvent,
    pub raw: &'static str,
    pub lifecycle: Lifecycle,
    pub fields: &'static [Field],
    pub writes: &'static [StateWrite],
    pub enrich: &'static [Enrich],
    pub resets: &'static [Category],
    pub clears: &'static [Category],
}

impl Binding {
    /// Whether the binding touches no state at all
    pub fn is_passthrough(&self) -> bool {
        self.writes.is_empty()
            && self.enrich.is_empty()
            && self.resets.is_empty()
            && self.clears.is_empty()
            && self.lifecycle == Lifecycle::None
    }
}

macro_rules! field {
    ($key:literal, $path:literal) => {
        Field { key: $key, source: Source::Raw($path) }
    };
    ($key:literal, $source:expr) => {
        Field { key: $key, source: $source }
    };
}

const PASSTHROUGH: Binding = Binding {
    event: VideoEvent::SetupComplete,
    raw: "",
    lifecycle: Lifecycle::None,
    fields: &[],
    writes: &[],
    enrich: &[],
    resets: &[],
    clears: &[],
};

const AD_STATE: Enrich = Enrich {
    category: Category::Ad,
    projection: Projection::All,
    required: true,
};

const AD_TIME_STATE: Enrich = Enrich {
    category: Category::AdTime,
    projection: Projection::All,
    required: true,
};

const MEDIA_IDS: Enrich = Enrich {
    category: Category::Media,
    projection: Projection::Keys(&[("contentId", "contentId"), ("contentUrl", "contentUrl")]),
    required: true,
};

const PLAYBACK_MODE: Enrich = Enrich {
    category: Category::MediaTime,
    projection: Projection::Keys(&[("playbackMode", "playbackMode")]),
    required: true,
};

const PLAYLIST_POSITION: Enrich = Enrich {
    category: Category::Playlist,
    projection: Projection::Keys(&[
        ("playlistItemCount", "playlistItemCount"),
        ("playlistItemIndex", "playlistItemIndex"),
    ]),
    required: true,
};

const PLAYLIST_COUNT: Enrich = Enrich {
    category: Category::Playlist,
    projection: Projection::Keys(&[("playlistItemCount", "playlistItemCount")]),
    required: true,
};

const AD_EPISODE: &[Category] = &[Category::Ad, Category::AdTime];

const AD_METADATA: &[Field] = &[
    field!("adTagUrl", "tag"),
    field!("offset", "adPosition"),
    field!("loadTime", "timeLoading"),
    field!("vastAdId", "id"),
    field!("adDescription", "description"),
    field!("adServer", "adsystem"),
    field!("adTitle", "adtitle"),
    field!("advertiserId", "advertiserId"),
    field!("advertiserName", "advertiser"),
    field!("dealId", "dealId"),
    field!("linear", "linear"),
    field!("vastVersion", "vastversion"),
    field!("creativeUrl", "mediaFile"),
    field!("adId", "adId"),
    field!("universalAdId", "universalAdId"),
    field!("creativeId", "creativeAdId"),
    field!("creativeType", "creativetype"),
    field!("redirectUrl", "clickThroughUrl"),
    field!("adPlacementType", Source::Placement("placement")),
    field!("waterfallIndex", "witem"),
    field!("waterfallCount", "wcount"),
];

const ERROR_DETAILS: &[Field] = &[
    field!("errorCode", "code"),
    field!("errorMessage", "message"),
    field!("error", "sourceError"),
];

const NESTED_ERROR_DETAILS: &[Field] = &[
    field!("errorCode", "error.code"),
    field!("errorMessage", "error.message"),
    field!("error", "error.sourceError"),
];

const WATERFALL: &[Field] = &[
    field!("waterfallIndex", "witem"),
    field!("waterfallCount", "wcount"),
];

/// Every binding, one per canonical event
pub static BINDINGS: &[Binding] = &[
    // Setup lifecycle
    Binding {
        event: VideoEvent::SetupComplete,
        raw: "ready",
        lifecycle: Lifecycle::Setup,
        fields: &[field!("playerVersion", Source::PlayerVersion)],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::SetupFailed,
        raw: "setupError",
        fields: &[
            field!("playerVersion", Source::PlayerVersion),
            field!("errorCode", "code"),
            field!("errorMessage", "message"),
            field!("error", "sourceError"),
        ],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Destroyed,
        raw: "remove",
        lifecycle: Lifecycle::Teardown,
        ..PASSTHROUGH
    },
    // Ad lifecycle
    Binding {
        event: VideoEvent::AdRequest,
        raw: "adRequest",
        fields: &[field!("adTagUrl", "tag")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdBreakStart,
        raw: "adBreakStart",
        fields: &[field!("offset", "adPosition")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdLoaded,
        raw: "adLoaded",
        fields: &[field!("adTagUrl", "tag"), field!("loadTime", "timeLoading")],
        writes: &[StateWrite {
            category: Category::Ad,
            mode: WriteMode::Merge,
            fields: AD_METADATA,
        }],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdStarted,
        raw: "adImpression",
        fields: &[
            field!("duration", "duration"),
            field!("waterfallIndex", "witem"),
            field!("waterfallCount", "wcount"),
        ],
        enrich: &[AD_STATE, AD_TIME_STATE],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdImpression,
        raw: "adViewableImpression",
        fields: WATERFALL,
        enrich: &[AD_STATE, AD_TIME_STATE],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdPlay,
        raw: "adPlay",
        fields: &[field!("adTagUrl", "tag")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdPause,
        raw: "adPause",
        fields: &[field!("adTagUrl", "tag")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdTime,
        raw: "adTime",
        fields: &[
            field!("adTagUrl", "tag"),
            field!("adCurrentTime", "position"),
            field!("adDuration", "duration"),
        ],
        writes: &[StateWrite {
            category: Category::AdTime,
            mode: WriteMode::Merge,
            fields: &[field!("adCurrentTime", "position"), field!("adDuration", "duration")],
        }],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdClick,
        raw: "adClick",
        enrich: &[AD_STATE, AD_TIME_STATE],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdSkipped,
        raw: "adSkipped",
        fields: &[field!("adCurrentTime", "position"), field!("adDuration", "duration")],
        enrich: &[AD_STATE, AD_TIME_STATE],
        resets: AD_EPISODE,
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdError,
        raw: "adError",
        fields: &[
            field!("playerErrorCode", "adErrorCode"),
            field!("vastErrorCode", "code"),
            field!("errorMessage", "message"),
        ],
        enrich: &[AD_STATE, AD_TIME_STATE],
        resets: AD_EPISODE,
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdComplete,
        raw: "adComplete",
        fields: &[field!("adTagUrl", "tag")],
        enrich: &[AD_STATE, AD_TIME_STATE],
        resets: AD_EPISODE,
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AdBreakEnd,
        raw: "adBreakEnd",
        fields: &[field!("offset", "adPosition")],
        ..PASSTHROUGH
    },
    // Content and playlist
    Binding {
        event: VideoEvent::Playlist,
        raw: "playlist",
        fields: &[
            field!("playlistItemCount", Source::Length("playlist")),
            field!("autostart", Source::Autostart),
        ],
        writes: &[StateWrite {
            category: Category::Playlist,
            mode: WriteMode::Replace,
            fields: &[field!("playlistItemCount", Source::Length("playlist"))],
        }],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::PlaybackRequest,
        raw: "playAttempt",
        fields: &[field!("playReason", "playReason")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::AutostartBlocked,
        raw: "autostartNotAllowed",
        fields: NESTED_ERROR_DETAILS,
        enrich: &[MEDIA_IDS, PLAYBACK_MODE],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::PlayAttemptFailed,
        raw: "playAttemptFailed",
        fields: &[
            field!("playReason", "playReason"),
            field!("errorCode", "error.code"),
            field!("errorMessage", "error.message"),
            field!("error", "error.sourceError"),
        ],
        enrich: &[MEDIA_IDS, PLAYLIST_POSITION, PLAYBACK_MODE],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::ContentLoaded,
        raw: "playlistItem",
        fields: &[
            field!("contentId", "item.mediaid"),
            field!("contentUrl", "item.file"),
            field!("title", "item.title"),
            field!("description", "item.description"),
            field!("playlistIndex", "index"),
            field!("autostart", Source::Autostart),
        ],
        writes: &[
            StateWrite {
                category: Category::Media,
                mode: WriteMode::Merge,
                fields: &[
                    field!("contentId", "item.mediaid"),
                    field!("contentUrl", "item.file"),
                    field!("title", "item.title"),
                    field!("description", "item.description"),
                    field!("playbackMode", Source::PlaybackMode("item.duration")),
                ],
            },
            StateWrite {
                category: Category::Playlist,
                mode: WriteMode::Merge,
                fields: &[field!("playlistItemIndex", "index")],
            },
        ],
        enrich: &[PLAYLIST_COUNT],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Play,
        raw: "play",
        enrich: &[MEDIA_IDS],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Pause,
        raw: "pause",
        enrich: &[MEDIA_IDS],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Buffer,
        raw: "buffer",
        enrich: &[Enrich {
            category: Category::MediaTime,
            projection: Projection::All,
            required: true,
        }],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Time,
        raw: "time",
        fields: &[field!("position", "position"), field!("duration", "duration")],
        writes: &[StateWrite {
            category: Category::MediaTime,
            mode: WriteMode::Merge,
            fields: &[
                field!("position", "position"),
                field!("duration", "duration"),
                field!("playbackMode", Source::PlaybackMode("duration")),
            ],
        }],
        enrich: &[MEDIA_IDS],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::SeekStart,
        raw: "seek",
        fields: &[field!("position", "position"), field!("duration", "duration")],
        writes: &[StateWrite {
            category: Category::PendingSeek,
            mode: WriteMode::Replace,
            fields: &[field!("offset", "offset"), field!("duration", "duration")],
        }],
        enrich: &[MEDIA_IDS],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::SeekEnd,
        raw: "seeked",
        enrich: &[
            MEDIA_IDS,
            Enrich {
                category: Category::PendingSeek,
                projection: Projection::Keys(&[("position", "offset"), ("duration", "duration")]),
                required: true,
            },
        ],
        clears: &[Category::PendingSeek],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Mute,
        raw: "mute",
        fields: &[field!("mute", "mute")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Volume,
        raw: "volume",
        fields: &[field!("volumePercentage", "volume")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::RenditionUpdate,
        raw: "visualQuality",
        fields: &[
            field!("videoReportedBitrate", "bitrate"),
            field!("audioReportedBitrate", "bitrate"),
            field!("encodedVideoWidth", "level.width"),
            field!("encodedVideoHeight", "level.height"),
        ],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Error,
        raw: "error",
        fields: ERROR_DETAILS,
        enrich: &[MEDIA_IDS, PLAYLIST_POSITION],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Complete,
        raw: "complete",
        enrich: &[MEDIA_IDS, PLAYLIST_POSITION, PLAYBACK_MODE],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::PlaylistComplete,
        raw: "playlistComplete",
        enrich: &[PLAYLIST_COUNT],
        clears: &[Category::Playlist],
        ..PASSTHROUGH
    },
    // UI and viewability
    Binding {
        event: VideoEvent::Fullscreen,
        raw: "fullscreen",
        fields: &[field!("fullscreen", "fullscreen")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::PlayerResize,
        raw: "resize",
        fields: &[field!("height", "height"), field!("width", "width")],
        ..PASSTHROUGH
    },
    Binding {
        event: VideoEvent::Viewable,
        raw: "viewable",
        fields: &[
            field!("viewable", "viewable"),
            field!("viewabilityPercentage", Source::Percent("percentViewable")),
        ],
        ..PASSTHROUGH
    },
];

/// The binding driven by a raw player event
pub fn binding_for_raw(raw: &str) -> Option<&'static Binding> {
    BINDINGS.iter().find(|binding| binding.raw == raw)
}

/// The binding producing a canonical event
pub fn binding_for_event(event: VideoEvent) -> Option<&'static Binding> {
    BINDINGS.iter().find(|binding| binding.event == event)
}

/// Every raw player event name the adapter listens to
pub fn raw_event_names() -> impl Iterator<Item = &'static str> {
    BINDINGS.iter().map(|binding| binding.raw)
}
