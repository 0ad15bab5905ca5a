//! Serialization and deserialization for design files.
//!
//! Designs are stored as camelCase JSON. The loader fills every missing
//! field with a default so files written by older revisions still open, and
//! only checks the minimum structure up front: a `version` marker and at
//! least one of `elements`, `customHouseData` or `lotConfiguration`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use yardplan_core::constants::{DEFAULT_TIME_OF_DAY, DEFAULT_WALL_HEIGHT_FT};
use yardplan_core::{DesignFileError, Point, ValidationError};

use crate::model::{
    normalize_degrees, CustomHouse, DesignElement, ElementData, ElementKind, Footprint,
    LotConfigurationData, Position3, RoofType, Season,
};

/// Design file format version
pub const FILE_FORMAT_VERSION: &str = "2.0";

/// Highest major format revision this build understands.
const MAX_MAJOR_VERSION: u32 = 2;

/// Complete design file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFile {
    pub version: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lot_configuration: LotConfigurationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_house_data: Option<CustomHouseData>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default)]
    pub view_settings: ViewSettings,
}

/// Serialized element
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub data: Value,
}

/// Serialized custom house
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomHouseData {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Outline relative to (`x`, `y`).
    #[serde(default)]
    pub outline: Vec<Point>,
    /// Older files call this `height`.
    #[serde(default = "default_wall_height", alias = "height")]
    pub wall_height: f64,
    #[serde(default, alias = "roof")]
    pub roof_type: RoofType,
    #[serde(default = "default_roof_pitch")]
    pub roof_pitch: f64,
    #[serde(default = "default_wall_color")]
    pub wall_color: String,
    #[serde(default = "default_roof_color")]
    pub roof_color: String,
    #[serde(default)]
    pub rotation: f64,
}

/// Persisted part of the view state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    #[serde(default = "default_scale")]
    pub p5_scale: f64,
    #[serde(default)]
    pub p5_pan_offset: PanOffset,
    #[serde(default)]
    pub current_season: Season,
    #[serde(default = "default_time_of_day")]
    pub time_of_day: f64,
}

/// Pan offset in feet
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PanOffset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

fn default_wall_height() -> f64 {
    DEFAULT_WALL_HEIGHT_FT
}
fn default_roof_pitch() -> f64 {
    CustomHouse::DEFAULT_ROOF_PITCH
}
fn default_wall_color() -> String {
    CustomHouse::DEFAULT_WALL_COLOR.to_string()
}
fn default_roof_color() -> String {
    CustomHouse::DEFAULT_ROOF_COLOR.to_string()
}
fn default_scale() -> f64 {
    1.0
}
fn default_time_of_day() -> f64 {
    DEFAULT_TIME_OF_DAY
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            p5_scale: default_scale(),
            p5_pan_offset: PanOffset::default(),
            current_season: Season::default(),
            time_of_day: default_time_of_day(),
        }
    }
}

impl ElementRecord {
    pub fn from_element(element: &DesignElement) -> Self {
        Self {
            id: element.id,
            element_type: element.kind.as_str().to_string(),
            name: element.name.clone(),
            x: element.position.x,
            y: element.position.y,
            z: element.position.z,
            width: Some(element.footprint.width),
            depth: Some(element.footprint.depth),
            height: Some(element.footprint.height),
            rotation: element.rotation,
            data: match &element.data {
                ElementData::None => Value::Null,
                data => serde_json::to_value(data).unwrap_or(Value::Null),
            },
        }
    }

    /// Rebuilds the element. Returns `None` for unknown element types;
    /// missing dimensions fall back to the kind's defaults.
    pub fn to_element(&self) -> Option<DesignElement> {
        let kind: ElementKind = match self.element_type.parse() {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!("Skipping element {}: {}", self.id, err);
                return None;
            }
        };
        let defaults = kind.descriptor().footprint;
        let dimension = |value: Option<f64>, fallback: f64| {
            value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(fallback)
        };
        let mut element = DesignElement::new(self.id, kind);
        if !self.name.is_empty() {
            element.name = self.name.clone();
        }
        element.position = Position3::new(self.x, self.y, self.z);
        element.footprint = Footprint::new(
            dimension(self.width, defaults.width),
            dimension(self.depth, defaults.depth),
            dimension(self.height, defaults.height),
        );
        element.rotation = if self.rotation.is_finite() {
            normalize_degrees(self.rotation)
        } else {
            0.0
        };
        element.data = ElementData::from_json_lenient(&self.data);
        Some(element)
    }
}

impl CustomHouseData {
    pub fn from_house(house: &CustomHouse) -> Self {
        Self {
            x: house.position.x,
            y: house.position.y,
            outline: house.outline.clone(),
            wall_height: house.wall_height,
            roof_type: house.roof,
            roof_pitch: house.roof_pitch,
            wall_color: house.wall_color.clone(),
            roof_color: house.roof_color.clone(),
            rotation: house.rotation,
        }
    }

    /// Rebuilds the house, validating the outline. Out-of-range wall
    /// heights are clamped rather than rejected.
    pub fn to_house(&self) -> Result<CustomHouse, ValidationError> {
        let origin = Point::new(self.x, self.y);
        let absolute: Vec<Point> = self.outline.iter().map(|p| *p + origin).collect();
        let mut house = CustomHouse::from_lot_outline(&absolute)?;
        // Keep the stored anchor; re-centring would shift old files slightly.
        let shift = house.position - origin;
        house.position = origin;
        house.outline = house.outline.iter().map(|p| *p + shift).collect();
        house.wall_height = CustomHouse::validate_wall_height(self.wall_height).unwrap_or_else(|_| {
            tracing::warn!("Wall height {} out of range, using default", self.wall_height);
            DEFAULT_WALL_HEIGHT_FT
        });
        house.roof = self.roof_type;
        if self.roof_pitch.is_finite() && self.roof_pitch >= 0.0 {
            house.roof_pitch = self.roof_pitch;
        }
        house.wall_color = self.wall_color.clone();
        house.roof_color = self.roof_color.clone();
        house.rotation = if self.rotation.is_finite() {
            normalize_degrees(self.rotation)
        } else {
            0.0
        };
        Ok(house)
    }
}

impl DesignFile {
    /// Create a new, empty design file
    pub fn new() -> Self {
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            created_at: Utc::now(),
            lot_configuration: LotConfigurationData::default(),
            custom_house_data: None,
            elements: Vec::new(),
            view_settings: ViewSettings::default(),
        }
    }

    /// Parse a design from JSON text, applying the minimal structural check.
    pub fn from_json(json: &str) -> std::result::Result<Self, DesignFileError> {
        let mut value: Value = serde_json::from_str(json)?;
        let obj = value.as_object_mut().ok_or(DesignFileError::Empty)?;

        let version = match obj.get("version") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(DesignFileError::MissingVersion),
        };
        let major = version
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok());
        match major {
            Some(m) if m > MAX_MAJOR_VERSION => {
                return Err(DesignFileError::UnknownVersion { version })
            }
            None => tracing::warn!("Unrecognised design file version '{}'", version),
            _ => {}
        }
        obj.insert("version".to_string(), Value::String(version));

        let has_content = ["elements", "customHouseData", "lotConfiguration"]
            .iter()
            .any(|key| obj.get(*key).is_some_and(|v| !v.is_null()));
        if !has_content {
            return Err(DesignFileError::Empty);
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> std::result::Result<String, DesignFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save design to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json().context("Failed to serialize design")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load design from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read file: {}", path.as_ref().display()))?;
        let design = Self::from_json(&content)
            .with_context(|| format!("Failed to load design: {}", path.as_ref().display()))?;
        Ok(design)
    }
}

impl Default for DesignFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_version() {
        let err = DesignFile::from_json(r#"{"elements": []}"#).unwrap_err();
        assert!(matches!(err, DesignFileError::MissingVersion));
    }

    #[test]
    fn test_requires_some_content() {
        let err = DesignFile::from_json(r#"{"version": "2.0"}"#).unwrap_err();
        assert!(matches!(err, DesignFileError::Empty));
    }

    #[test]
    fn test_rejects_newer_major_version() {
        let err = DesignFile::from_json(r#"{"version": "3.1", "elements": []}"#).unwrap_err();
        assert!(matches!(err, DesignFileError::UnknownVersion { .. }));
    }

    #[test]
    fn test_numeric_version_and_defaults() {
        let design = DesignFile::from_json(r#"{"version": 1, "elements": []}"#).unwrap();
        assert_eq!(design.version, "1");
        assert_eq!(design.view_settings.p5_scale, 1.0);
        assert_eq!(design.view_settings.current_season, Season::Summer);
        assert!(!design.lot_configuration.is_custom_shape);
    }

    #[test]
    fn test_height_alias_on_custom_house() {
        let json = r#"{
            "version": "1.0",
            "customHouseData": {
                "x": 20, "y": 20,
                "outline": [{"x":-5,"y":-5},{"x":5,"y":-5},{"x":5,"y":5},{"x":-5,"y":5}],
                "height": 14
            }
        }"#;
        let design = DesignFile::from_json(json).unwrap();
        let house = design.custom_house_data.unwrap().to_house().unwrap();
        assert_eq!(house.wall_height, 14.0);
        assert_eq!(house.position, Point::new(20.0, 20.0));
    }

    #[test]
    fn test_missing_dimensions_default_from_kind() {
        let record: ElementRecord =
            serde_json::from_str(r#"{"id": 3, "type": "shed", "x": 10, "y": 12}"#).unwrap();
        let element = record.to_element().unwrap();
        assert_eq!(element.footprint, ElementKind::Shed.descriptor().footprint);
        assert_eq!(element.name, "Shed");
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let record: ElementRecord =
            serde_json::from_str(r#"{"id": 3, "type": "gazebo"}"#).unwrap();
        assert!(record.to_element().is_none());
    }
}
