//! Decoder settings, loadable from JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest payload length accepted by default (1 MiB).
pub const DEFAULT_MAX_PACKET_LEN: u64 = 1 << 20;

/// What happens to current tag values between packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    /// Values persist; a tag absent from a packet shows its last good value.
    #[default]
    CarryForward,
    /// Every packet starts with no current values.
    ResetPerPacket,
}

/// How IMAPB-encoded tags are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImapbMode {
    /// The raw unit-interval fraction.
    #[default]
    Fraction,
    /// `min + fraction * (max - min)` over the tag's declared range.
    Physical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub value_mode: ValueMode,
    pub imapb: ImapbMode,
    pub max_packet_len: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            value_mode: ValueMode::default(),
            imapb: ImapbMode::default(),
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecoderConfig {
    /// Parse a config; missing fields take their defaults.
    ///
    /// # Examples
    /// ```
    /// use klvwatch_core::{DecoderConfig, ValueMode};
    ///
    /// let config = DecoderConfig::from_json(r#"{"value_mode": "reset_per_packet"}"#).unwrap();
    /// assert_eq!(config.value_mode, ValueMode::ResetPerPacket);
    /// assert_eq!(config.max_packet_len, 1 << 20);
    /// ```
    ///
    /// # Errors
    /// `ConfigError::Json` on malformed input or unknown enum values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, otherwise as
    /// [`DecoderConfig::from_json`].
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
