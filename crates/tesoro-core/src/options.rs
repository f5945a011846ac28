use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Close-button tint.
///
/// `Label` defers to the host platform's label/foreground color so the
/// button follows light and dark appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Label,
    Rgba {
        red: u8,
        green: u8,
        blue: u8,
        alpha: u8,
    },
}

impl Color {
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::Rgba {
            red,
            green,
            blue,
            alpha: u8::MAX,
        }
    }

    /// Packs as `0xRRGGBBAA`; `None` for the platform label color.
    #[must_use]
    pub fn to_rgba_u32(self) -> Option<u32> {
        match self {
            Self::Label => None,
            Self::Rgba {
                red,
                green,
                blue,
                alpha,
            } => Some(u32::from_be_bytes([red, green, blue, alpha])),
        }
    }

    #[must_use]
    pub fn from_rgba_u32(value: u32) -> Self {
        let [red, green, blue, alpha] = value.to_be_bytes();
        Self::Rgba {
            red,
            green,
            blue,
            alpha,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => f.write_str("label"),
            Self::Rgba {
                red,
                green,
                blue,
                alpha,
            } => write!(f, "#{red:02x}{green:02x}{blue:02x}{alpha:02x}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color must be `label` or a #RRGGBB / #RRGGBBAA hex value")]
    InvalidFormat,
    #[error("color contains a non-hex digit")]
    InvalidDigit,
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("label") {
            return Ok(Self::Label);
        }
        let Some(hex) = trimmed.strip_prefix('#') else {
            return Err(ColorParseError::InvalidFormat);
        };
        if !hex.is_ascii() {
            return Err(ColorParseError::InvalidDigit);
        }
        let channel = |index: usize| {
            u8::from_str_radix(&hex[index..index + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit)
        };
        match hex.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::Rgba {
                red: channel(0)?,
                green: channel(2)?,
                blue: channel(4)?,
                alpha: channel(6)?,
            }),
            _ => Err(ColorParseError::InvalidFormat),
        }
    }
}

/// Per-call presentation options for the Value Wall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_button_color: Option<Color>,
}

impl PresentationOptions {
    #[must_use]
    pub fn with_close_button_color(color: Color) -> Self {
        Self {
            close_button_color: Some(color),
        }
    }

    #[must_use]
    pub fn resolved_close_button_color(&self) -> Color {
        self.close_button_color.unwrap_or_default()
    }
}
