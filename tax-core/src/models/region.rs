use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum-wage region. Region I is the highest-wage area (urban Hanoi and
/// Ho Chi Minh City), region IV the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RegionType {
    #[default]
    I,
    II,
    III,
    IV,
}

impl RegionType {
    pub fn all() -> &'static [RegionType] {
        &[Self::I, Self::II, Self::III, Self::IV]
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::I => 1,
            Self::II => 2,
            Self::III => 3,
            Self::IV => 4,
        }
    }

    /// Zero-based position in a four-column regional table.
    pub fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::I),
            2 => Some(Self::II),
            3 => Some(Self::III),
            4 => Some(Self::IV),
            _ => None,
        }
    }

    /// Like [`RegionType::from_number`] but falls back to region I.
    pub fn from_number_or_default(number: i64) -> Self {
        u8::try_from(number)
            .ok()
            .and_then(Self::from_number)
            .unwrap_or_default()
    }
}

impl TryFrom<u8> for RegionType {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("region must be 1-4, got {number}"))
    }
}

impl From<RegionType> for u8 {
    fn from(region: RegionType) -> Self {
        region.number()
    }
}

impl fmt::Display for RegionType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Region {}", self.number())
    }
}
