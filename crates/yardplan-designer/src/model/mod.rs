//! Design data model: elements, the custom house, the lot and the
//! environment settings that drive lighting.

mod custom_house;
mod element;
mod kind;
mod lot;

pub use custom_house::{CustomHouse, RoofType};
pub use element::{
    normalize_degrees, DesignElement, ElementData, Footprint, ModelData, PlantData, Position3,
    StructureData, SurfaceData,
};
pub use kind::{descriptor, ElementDescriptor, ElementKind, Outline2D, RenderStrategy};
pub use lot::{LotConfiguration, LotConfigurationData};
pub use yardplan_core::Point;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season used for lighting and seasonal plant appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    #[default]
    Summer,
    #[serde(alias = "fall")]
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }

    /// Month and day of the equinox or solstice that opens the season.
    pub fn reference_date(&self) -> (u32, u32) {
        match self {
            Self::Spring => (3, 20),
            Self::Summer => (6, 21),
            Self::Autumn => (9, 22),
            Self::Winter => (12, 21),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "autumn" | "fall" => Ok(Self::Autumn),
            "winter" => Ok(Self::Winter),
            _ => Err(format!("Unknown season: {}", s)),
        }
    }
}

/// Parses `#rrggbb` (or `rrggbb`) into RGB bytes.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Formats RGB bytes as `#rrggbb`.
pub fn to_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
