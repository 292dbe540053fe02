//! Session configuration
//!
//! Mirrors the host page's player configuration object:
//!
//! ```json
//! {
//!   "divId": "player",
//!   "autostart": true,
//!   "mute": false,
//!   "licenseKey": "abc",
//!   "params": { "vendorConfig": { "advertising": { "skipoffset": 5 } } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SdkError};

/// Oldest player version sessions can attach to
pub const MIN_PLAYER_VERSION: &str = "8.20.0";

/// Configuration for one player session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Id of the element hosting the player
    pub div_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub autostart: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,

    pub params: SessionParams,
}

/// Player-specific parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionParams {
    /// Opaque player setup object, passed through to the player
    pub vendor_config: Map<String, Value>,
}

impl SessionConfig {
    pub fn new(div_id: impl Into<String>) -> Self {
        Self {
            div_id: div_id.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = Some(autostart);
        self
    }

    pub fn with_mute(mut self, mute: bool) -> Self {
        self.mute = Some(mute);
        self
    }

    pub fn with_license_key(mut self, key: impl Into<String>) -> Self {
        self.license_key = Some(key.into());
        self
    }

    pub fn with_vendor_config(mut self, vendor_config: Map<String, Value>) -> Self {
        self.params.vendor_config = vendor_config;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.div_id.trim().is_empty() {
            return Err(SdkError::InvalidConfig("divId must not be empty".to_string()));
        }

        match self.params.vendor_config.get("advertising") {
            None | Some(Value::Object(_)) => Ok(()),
            Some(other) => Err(SdkError::InvalidConfig(format!(
                "vendorConfig.advertising must be an object, got {}",
                other
            ))),
        }
    }

    /// Configured ad skip offset in seconds; negative means not skippable
    pub fn skip_offset(&self) -> Option<f64> {
        self.params
            .vendor_config
            .get("advertising")?
            .get("skipoffset")?
            .as_f64()
    }

    /// Base state of the `Ad` category, restored after every ad
    pub fn ad_base_state(&self) -> Map<String, Value> {
        let mut base = Map::new();
        let configured = self
            .params
            .vendor_config
            .get("advertising")
            .and_then(|advertising| advertising.get("skipoffset"));

        if let Some(raw) = configured.filter(|raw| raw.is_number()) {
            let skippable = raw.as_f64().map_or(false, |offset| offset >= 0.0);
            base.insert("skipOffset".to_string(), raw.clone());
            base.insert("skippable".to_string(), Value::Bool(skippable));
        }
        base
    }

    /// Setup object handed to the player
    ///
    /// Starts from the vendor config and fills `autostart`, `mute` and `key`
    /// only where the vendor config leaves them unset. Without a media source
    /// the player is configured as an outstream VAST ad player.
    pub fn player_setup(&self) -> Map<String, Value> {
        let mut setup = self.params.vendor_config.clone();

        if let Some(autostart) = self.autostart {
            setup.entry("autostart").or_insert(Value::Bool(autostart));
        }
        if let Some(mute) = self.mute {
            setup.entry("mute").or_insert(Value::Bool(mute));
        }
        let has_key = setup
            .get("key")
            .map_or(false, |key| !key.is_null() && key.as_str() != Some(""));
        if !has_key {
            if let Some(license_key) = &self.license_key {
                setup.insert("key".to_string(), Value::from(license_key.clone()));
            }
        }

        let mut advertising = match setup.remove("advertising") {
            Some(Value::Object(advertising)) => advertising,
            _ => Map::new(),
        };
        let has_source = ["file", "playlist", "source"]
            .iter()
            .any(|key| setup.get(*key).map_or(false, |v| !v.is_null()));
        if !has_source {
            advertising.insert("outstream".to_string(), Value::Bool(true));
            advertising
                .entry("client")
                .or_insert_with(|| Value::from("vast"));
        }
        setup.insert("advertising".to_string(), Value::Object(advertising));

        setup
    }
}

/// Whether a reported player version meets `MIN_PLAYER_VERSION`
///
/// Versions compare numerically by dotted segment; missing segments count as
/// zero and any non-numeric suffix of a segment is ignored.
pub fn is_supported_version(version: &str) -> bool {
    parse_version(version) >= parse_version(MIN_PLAYER_VERSION)
}

fn parse_version(version: &str) -> [u64; 3] {
    let mut parts = [0u64; 3];
    for (slot, segment) in parts.iter_mut().zip(version.trim().split('.')) {
        let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
        *slot = digits.parse().unwrap_or(0);
    }
    parts
}
