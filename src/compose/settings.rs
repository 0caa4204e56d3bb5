use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::foundation::core::Rgba8;
use crate::foundation::error::ThenNowError;

/// Output aspect ratio selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    /// Derived from the two sources.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// 16:9 landscape.
    #[serde(rename = "16:9")]
    Landscape16x9,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait9x16,
    /// 21:9 ultrawide.
    #[serde(rename = "21:9")]
    Ultrawide21x9,
    /// 3:4 portrait.
    #[serde(rename = "3:4")]
    Portrait3x4,
    /// 4:3 landscape.
    #[serde(rename = "4:3")]
    Landscape4x3,
}

impl AspectRatio {
    /// Every selectable ratio, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Auto,
        Self::Landscape16x9,
        Self::Portrait9x16,
        Self::Ultrawide21x9,
        Self::Portrait3x4,
        Self::Landscape4x3,
    ];

    /// `(width, height)` ratio terms; `None` for [`AspectRatio::Auto`].
    pub fn terms(self) -> Option<(u32, u32)> {
        match self {
            Self::Auto => None,
            Self::Landscape16x9 => Some((16, 9)),
            Self::Portrait9x16 => Some((9, 16)),
            Self::Ultrawide21x9 => Some((21, 9)),
            Self::Portrait3x4 => Some((3, 4)),
            Self::Landscape4x3 => Some((4, 3)),
        }
    }

    /// Persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Landscape16x9 => "16:9",
            Self::Portrait9x16 => "9:16",
            Self::Ultrawide21x9 => "21:9",
            Self::Portrait3x4 => "3:4",
            Self::Landscape4x3 => "4:3",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = ThenNowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| ThenNowError::validation(format!("unknown aspect ratio '{s}'")))
    }
}

/// Arrow glyph style drawn across the seam.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    /// Block arrow with a rectangular shaft.
    #[default]
    Classic,
    /// Circular badge with an inverted arrow inside.
    Modern,
    /// Three stroked chevrons.
    Minimal,
    /// No arrow.
    None,
}

impl ArrowStyle {
    /// Every style, in menu order.
    pub const ALL: [Self; 4] = [Self::Classic, Self::Modern, Self::Minimal, Self::None];

    /// Persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Minimal => "minimal",
            Self::None => "none",
        }
    }
}

impl FromStr for ArrowStyle {
    type Err = ThenNowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ThenNowError::validation(format!("unknown arrow style '{s}'")))
    }
}

/// Arrow fill color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowColor {
    /// `#ffffff`
    #[default]
    White,
    /// `#000000`
    Black,
    /// `#ef4444`
    Red,
}

impl ArrowColor {
    /// Every color, in menu order.
    pub const ALL: [Self; 3] = [Self::White, Self::Black, Self::Red];

    /// Fill color.
    pub fn rgba(self) -> Rgba8 {
        match self {
            Self::White => Rgba8::WHITE,
            Self::Black => Rgba8::BLACK,
            Self::Red => Rgba8::opaque(0xef, 0x44, 0x44),
        }
    }

    /// Persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
            Self::Red => "red",
        }
    }
}

impl FromStr for ArrowColor {
    type Err = ThenNowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ThenNowError::validation(format!("unknown arrow color '{s}'")))
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {$(
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

display_as_str!(AspectRatio, ArrowStyle, ArrowColor);

/// Global composite settings, persisted as one record.
///
/// Unrecognized or wrongly typed enum values in a stored record fall back to that field's default
/// instead of discarding the whole record.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Output aspect ratio.
    #[serde(deserialize_with = "lenient")]
    pub aspect_ratio: AspectRatio,
    /// Label drawn on the first half.
    pub before_label: String,
    /// Label drawn on the second half.
    pub after_label: String,
    /// Arrow glyph style.
    #[serde(deserialize_with = "lenient")]
    pub arrow_style: ArrowStyle,
    /// Arrow fill color.
    #[serde(deserialize_with = "lenient")]
    pub arrow_color: ArrowColor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::Auto,
            before_label: "Before".to_string(),
            after_label: "After".to_string(),
            arrow_style: ArrowStyle::Classic,
            arrow_color: ArrowColor::White,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/settings.rs"]
mod tests;
