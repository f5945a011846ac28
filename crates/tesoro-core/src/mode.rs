use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const PRODUCTION_BASE_ENDPOINT: &str = "https://valuewall.tesoroxp.com";
pub const TEST_BASE_ENDPOINT: &str = "https://test.valuewall.tesoroxp.com";

/// Deployment environment the Value Wall loads from.
///
/// Endpoints are fixed at compile time. Nothing in the SDK lets a caller or
/// the environment substitute a different authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    Test,
}

impl Mode {
    pub const ALL: [Self; 2] = [Self::Production, Self::Test];

    #[must_use]
    pub fn base_endpoint(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_BASE_ENDPOINT,
            Self::Test => TEST_BASE_ENDPOINT,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    /// production=0 test=1; unknown values map to production.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Test,
            _ => Self::Production,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Production => 0,
            Self::Test => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode `{0}` (expected production or test)")]
pub struct UnknownModeError(pub String);

impl FromStr for Mode {
    type Err = UnknownModeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "production" | "prod" | "live" => Ok(Self::Production),
            "test" | "testing" | "sandbox" => Ok(Self::Test),
            _ => Err(UnknownModeError(raw.trim().to_string())),
        }
    }
}
