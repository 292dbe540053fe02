//! Field extraction from raw player events
//!
//! A `Field` names one payload key and where its value comes from. Absent
//! sources produce no key at all; nothing is defaulted.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::adapter::AdapterContext;
use crate::raw::RawEvent;
use crate::Payload;

/// Where a field's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Copy the raw value at a dotted path
    Raw(&'static str),
    /// Classify the numeric duration at a path into a `PlaybackMode` code
    PlaybackMode(&'static str),
    /// Map the placement name at a path to its numeric code
    Placement(&'static str),
    /// Length of the array at a path
    Length(&'static str),
    /// Fraction at a path scaled to a percentage
    Percent(&'static str),
    /// Version string reported by the player
    PlayerVersion,
    /// Autostart flag from the session configuration
    Autostart,
}

/// One extracted payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub source: Source,
}

/// How content is being played back, derived from its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Video on demand (positive duration)
    Vod,
    /// Live, not seekable (zero duration)
    Live,
    /// Live with a seekable window (negative duration)
    Dvr,
}

impl PlaybackMode {
    pub fn from_duration(duration: f64) -> Self {
        if duration > 0.0 {
            PlaybackMode::Vod
        } else if duration < 0.0 {
            PlaybackMode::Dvr
        } else {
            PlaybackMode::Live
        }
    }

    /// Numeric code reported in payloads
    pub fn code(&self) -> u8 {
        match self {
            PlaybackMode::Vod => 0,
            PlaybackMode::Live => 1,
            PlaybackMode::Dvr => 2,
        }
    }
}

/// Numeric ad placement code for a player placement name
pub fn placement_code(placement: &str) -> Option<u8> {
    match placement {
        "instream" => Some(1),
        "banner" => Some(2),
        "article" => Some(3),
        "feed" => Some(4),
        "interstitial" | "slider" | "floating" => Some(5),
        _ => None,
    }
}

impl Field {
    /// Resolve this field against a raw event
    pub fn resolve(&self, raw: &RawEvent, context: &AdapterContext) -> Option<Value> {
        match self.source {
            Source::Raw(path) => raw.get(path).cloned(),
            Source::PlaybackMode(path) => raw
                .get_f64(path)
                .map(|duration| Value::from(PlaybackMode::from_duration(duration).code())),
            Source::Placement(path) => raw
                .get_str(path)
                .and_then(placement_code)
                .map(Value::from),
            Source::Length(path) => raw
                .get(path)
                .and_then(Value::as_array)
                .map(|items| Value::from(items.len())),
            Source::Percent(path) => raw
                .get_f64(path)
                .and_then(|fraction| Number::from_f64(fraction * 100.0))
                .map(Value::Number),
            Source::PlayerVersion => Some(Value::from(context.player_version.clone())),
            Source::Autostart => context.autostart.map(Value::Bool),
        }
    }
}

/// Extract every resolvable field into a fresh payload
pub fn extract(fields: &[Field], raw: &RawEvent, context: &AdapterContext) -> Payload {
    fields
        .iter()
        .filter_map(|field| {
            field
                .resolve(raw, context)
                .map(|value| (field.key.to_string(), value))
        })
        .collect()
}
