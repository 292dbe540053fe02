//! Raw player event data
//!
//! The player hands every listener one event-data object whose shape depends
//! on the raw event name. Only the fields a binding names are ever read;
//! everything else on the object is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw event-data object as delivered by the player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    /// An event carrying no data
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything other than an object reads as empty
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                tracing::debug!("Ignoring non-object raw event data: {}", other);
                Self::default()
            }
        }
    }

    /// Parse event data from a JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look up a field by dotted path (e.g. `"item.mediaid"`)
    ///
    /// Returns `None` when any segment is missing, when an intermediate value
    /// is not an object, or when the value is JSON `null`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        (!current.is_null()).then_some(current)
    }

    /// Numeric field by dotted path
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    /// String field by dotted path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// The underlying object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let raw = RawEvent::from(json!({
            "index": 2,
            "item": { "mediaid": "abc", "file": "https://cdn.example/v.mp4" },
            "level": { "width": 1280, "height": 720 }
        }));

        assert_eq!(raw.get("item.mediaid"), Some(&json!("abc")));
        assert_eq!(raw.get_f64("level.width"), Some(1280.0));
        assert_eq!(raw.get_str("item.file"), Some("https://cdn.example/v.mp4"));
        assert_eq!(raw.get("index"), Some(&json!(2)));
    }

    #[test]
    fn test_missing_and_null_read_as_absent() {
        let raw = RawEvent::from(json!({ "tag": null, "item": "not-an-object" }));

        assert_eq!(raw.get("tag"), None);
        assert_eq!(raw.get("item.mediaid"), None);
        assert_eq!(raw.get("nothing"), None);
        assert_eq!(raw.get(""), None);
    }

    #[test]
    fn test_non_object_is_empty() {
        assert_eq!(RawEvent::from(json!([1, 2, 3])), RawEvent::empty());
        assert_eq!(RawEvent::from(json!("text")).as_map().len(), 0);
    }

    #[test]
    fn test_from_json() {
        let raw = RawEvent::from_json(r#"{"mute": true, "extra": {"ignored": 1}}"#).unwrap();
        assert_eq!(raw.get("mute"), Some(&json!(true)));

        assert!(RawEvent::from_json("[]").is_err());
    }
}
