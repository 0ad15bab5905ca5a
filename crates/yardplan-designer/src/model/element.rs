//! Placed design elements.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind::{ElementDescriptor, ElementKind};
use super::Season;
use yardplan_core::geometry::Bounds;
use yardplan_core::Point;

/// Width (x), depth (y) and height (z) of an element, in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Footprint {
    pub fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }
}

/// Element position in feet. `x`/`y` are the footprint centre on the lot,
/// `z` the base elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Catalog-backed vegetation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantData {
    pub species: String,
    #[serde(default)]
    pub is_tree: bool,
    #[serde(default)]
    pub canopy_diameter: f64,
    #[serde(default)]
    pub mature_height: f64,
}

/// Colours for built structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureData {
    #[serde(default)]
    pub wall_color: Option<String>,
    #[serde(default)]
    pub roof_color: Option<String>,
}

/// Ground surface material (patio stone, gravel, mulch...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceData {
    pub material: String,
}

/// Element drawn from an arbitrary model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    pub path: String,
}

/// Type-specific element data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ElementData {
    #[default]
    None,
    Plant(PlantData),
    Structure(StructureData),
    Surface(SurfaceData),
    Model(ModelData),
}

impl ElementData {
    /// Decodes a save-file data blob, tolerating blobs written before the
    /// `kind` tag existed.
    pub fn from_json_lenient(value: &Value) -> Self {
        if value.is_null() {
            return Self::None;
        }
        if let Ok(data) = serde_json::from_value::<ElementData>(value.clone()) {
            return data;
        }
        if value.get("species").is_some() {
            if let Ok(plant) = serde_json::from_value::<PlantData>(value.clone()) {
                return Self::Plant(plant);
            }
        }
        if let Some(path) = value
            .get("modelPath")
            .or_else(|| value.get("path"))
            .and_then(Value::as_str)
        {
            return Self::Model(ModelData {
                path: path.to_string(),
            });
        }
        if let Some(material) = value.get("material").and_then(Value::as_str) {
            return Self::Surface(SurfaceData {
                material: material.to_string(),
            });
        }
        if value.get("wallColor").is_some() || value.get("roofColor").is_some() {
            if let Ok(structure) = serde_json::from_value::<StructureData>(value.clone()) {
                return Self::Structure(structure);
            }
        }
        tracing::debug!("Unrecognised element data blob, ignoring: {}", value);
        Self::None
    }

    pub fn as_plant(&self) -> Option<&PlantData> {
        match self {
            Self::Plant(p) => Some(p),
            _ => None,
        }
    }
}

/// A single placed design object.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignElement {
    pub id: u64,
    pub kind: ElementKind,
    pub name: String,
    pub position: Position3,
    pub footprint: Footprint,
    /// Degrees, always in `[0, 360)`.
    pub rotation: f64,
    pub data: ElementData,
}

impl DesignElement {
    /// Creates an element with the registry defaults for `kind`.
    pub fn new(id: u64, kind: ElementKind) -> Self {
        let desc = kind.descriptor();
        Self {
            id,
            kind,
            name: desc.label.to_string(),
            position: Position3::default(),
            footprint: desc.footprint,
            rotation: 0.0,
            data: ElementData::None,
        }
    }

    pub fn descriptor(&self) -> &'static ElementDescriptor {
        self.kind.descriptor()
    }

    pub fn center(&self) -> Point {
        self.position.xy()
    }

    pub fn is_tree(&self) -> bool {
        self.data.as_plant().is_some_and(|p| p.is_tree)
    }

    pub fn species(&self) -> Option<&str> {
        self.data.as_plant().map(|p| p.species.as_str())
    }

    /// Cache key component for seasonal vegetation models.
    pub fn model_key(&self, season: Season) -> Option<(String, Season)> {
        self.species().map(|s| (s.to_string(), season))
    }

    /// The four footprint corners after rotation, in feet.
    pub fn corners(&self) -> [Point; 4] {
        let c = self.center();
        let hw = self.footprint.width / 2.0;
        let hd = self.footprint.depth / 2.0;
        [
            Point::new(c.x - hw, c.y - hd),
            Point::new(c.x + hw, c.y - hd),
            Point::new(c.x + hw, c.y + hd),
            Point::new(c.x - hw, c.y + hd),
        ]
        .map(|p| p.rotated_about(&c, self.rotation))
    }

    /// Axis-aligned bounds of the rotated footprint.
    pub fn bounds(&self) -> Bounds {
        yardplan_core::geometry::bounds(&self.corners())
    }

    /// Hit test: the point is rotated into the element's frame and checked
    /// against the unrotated footprint.
    pub fn contains_point(&self, point: &Point) -> bool {
        let c = self.center();
        let local = point.rotated_about(&c, -self.rotation);
        (local.x - c.x).abs() <= self.footprint.width / 2.0
            && (local.y - c.y).abs() <= self.footprint.depth / 2.0
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn test_contains_point_respects_rotation() {
        let mut fence = DesignElement::new(1, ElementKind::Fence);
        fence.position = Position3::new(50.0, 50.0, 0.0);
        // 20 ft long along x before rotation
        assert!(fence.contains_point(&Point::new(59.0, 50.0)));
        fence.rotation = 90.0;
        assert!(!fence.contains_point(&Point::new(59.0, 50.0)));
        assert!(fence.contains_point(&Point::new(50.0, 59.0)));
    }

    #[test]
    fn test_lenient_data_decoding() {
        let tagged = json!({"kind": "plant", "species": "red-maple", "isTree": true});
        assert!(matches!(
            ElementData::from_json_lenient(&tagged),
            ElementData::Plant(PlantData { is_tree: true, .. })
        ));

        let legacy = json!({"species": "lavender"});
        assert_eq!(
            ElementData::from_json_lenient(&legacy)
                .as_plant()
                .map(|p| p.species.as_str()),
            Some("lavender")
        );

        let model = json!({"modelPath": "models/bench.stl"});
        assert!(matches!(
            ElementData::from_json_lenient(&model),
            ElementData::Model(_)
        ));

        assert_eq!(ElementData::from_json_lenient(&json!({})), ElementData::None);
        assert_eq!(ElementData::from_json_lenient(&Value::Null), ElementData::None);
    }
}
