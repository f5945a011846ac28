use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::presentation::ReplacementPolicy;
use crate::session::Metadata;

pub const ENV_MODE: &str = "TESORO_MODE";
pub const MODE_SOURCE_EXPLICIT: &str = "explicit";
pub const MODE_SOURCE_DEFAULT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid json sdk config: {message}")]
    Json { message: String },
    #[error("invalid toml sdk config: {message}")]
    Toml { message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml {
            message: err.to_string(),
        }
    }
}

/// Serialized form of a `configure` call.
///
/// ```json
/// { "mode": "test", "player_id": "player_123", "metadata": { "campaign": "summer2024" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    pub mode: Mode,
    #[serde(alias = "playerId")]
    pub player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SdkConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

/// Facade behavior that is fixed for the lifetime of a `Tesoro` context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkSettings {
    #[serde(default)]
    pub replacement_policy: ReplacementPolicy,
}

/// Picks a mode from an explicit value, then `TESORO_MODE`, then production.
///
/// The environment only chooses between the built-in modes; endpoints stay
/// fixed. The returned label names the source that won.
#[must_use]
pub fn resolve_mode(explicit: Option<Mode>) -> (Mode, String) {
    if let Some(mode) = explicit {
        return (mode, MODE_SOURCE_EXPLICIT.to_string());
    }

    if let Some(raw) = env_non_empty(ENV_MODE) {
        return match raw.parse::<Mode>() {
            Ok(mode) => (mode, ENV_MODE.to_string()),
            Err(_) => (
                Mode::Production,
                format!("{ENV_MODE}:invalid({raw})->{}", Mode::Production),
            ),
        };
    }

    (Mode::Production, MODE_SOURCE_DEFAULT.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
