use std::fmt;
use std::str::FromStr;

use crate::foundation::error::ThenNowError;

/// One of the two image slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    /// Left or top half.
    #[serde(alias = "then")]
    Before,
    /// Right or bottom half.
    #[serde(alias = "now")]
    After,
}

impl SlotId {
    /// Both slots in render order.
    pub const ALL: [Self; 2] = [Self::Before, Self::After];

    /// Storage key and display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }

    /// Position in [`SlotId::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Before => 0,
            Self::After => 1,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotId {
    type Err = ThenNowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" | "then" => Ok(Self::Before),
            "after" | "now" => Ok(Self::After),
            other => Err(ThenNowError::validation(format!(
                "unknown slot '{other}' (expected before|after)"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slots/slot.rs"]
mod tests;
