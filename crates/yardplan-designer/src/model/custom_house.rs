//! The free-form custom house.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use yardplan_core::constants::{DEFAULT_WALL_HEIGHT_FT, MAX_WALL_HEIGHT_FT, MIN_WALL_HEIGHT_FT};
use yardplan_core::geometry::{self, Bounds};
use yardplan_core::{Point, ValidationError};

/// Roof style for the custom house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofType {
    Flat,
    #[default]
    Gabled,
    Hipped,
}

impl fmt::Display for RoofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Gabled => write!(f, "gabled"),
            Self::Hipped => write!(f, "hipped"),
        }
    }
}

impl FromStr for RoofType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "gabled" | "gable" => Ok(Self::Gabled),
            "hipped" | "hip" => Ok(Self::Hipped),
            _ => Err(format!("Unknown roof type: {}", s)),
        }
    }
}

/// A house defined by a user-drawn outline.
///
/// `outline` is stored relative to `position` (the outline centroid) in
/// counter-clockwise order.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomHouse {
    pub position: Point,
    pub outline: Vec<Point>,
    pub wall_height: f64,
    pub roof: RoofType,
    /// Roof rise per unit of horizontal run.
    pub roof_pitch: f64,
    pub wall_color: String,
    pub roof_color: String,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
}

impl CustomHouse {
    pub const DEFAULT_WALL_COLOR: &'static str = "#d9c7a7";
    pub const DEFAULT_ROOF_COLOR: &'static str = "#6b4f3a";
    pub const DEFAULT_ROOF_PITCH: f64 = 0.5;

    /// Builds a house from an outline in lot feet. The outline is validated
    /// and re-centred on its centroid.
    pub fn from_lot_outline(points: &[Point]) -> Result<Self, ValidationError> {
        let outline = geometry::validate_polygon(points)?;
        let center = geometry::centroid(&outline);
        Ok(Self {
            position: center,
            outline: outline.iter().map(|p| *p - center).collect(),
            wall_height: DEFAULT_WALL_HEIGHT_FT,
            roof: RoofType::default(),
            roof_pitch: Self::DEFAULT_ROOF_PITCH,
            wall_color: Self::DEFAULT_WALL_COLOR.to_string(),
            roof_color: Self::DEFAULT_ROOF_COLOR.to_string(),
            rotation: 0.0,
        })
    }

    /// Outline in lot feet, with rotation applied.
    pub fn lot_outline(&self) -> Vec<Point> {
        let origin = Point::default();
        self.outline
            .iter()
            .map(|p| p.rotated_about(&origin, self.rotation) + self.position)
            .collect()
    }

    /// Bounds of the local (unrotated) outline.
    pub fn local_bounds(&self) -> Bounds {
        geometry::bounds(&self.outline)
    }

    /// Bounds of the placed outline in lot feet.
    pub fn bounds(&self) -> Bounds {
        geometry::bounds(&self.lot_outline())
    }

    /// Point-in-polygon test against the local outline.
    pub fn contains_point(&self, point: &Point) -> bool {
        let local = (*point - self.position).rotated_about(&Point::default(), -self.rotation);
        geometry::point_in_polygon(&local, &self.outline)
    }

    pub fn validate_wall_height(height: f64) -> Result<f64, ValidationError> {
        ValidationError::require_range("Wall height", height, MIN_WALL_HEIGHT_FT, MAX_WALL_HEIGHT_FT)
    }

    /// Roof rise above the wall top for the current roof style.
    pub fn roof_rise(&self) -> f64 {
        match self.roof {
            RoofType::Flat => 0.0,
            RoofType::Gabled | RoofType::Hipped => {
                let (min_x, min_y, max_x, max_y) = self.local_bounds();
                let short_side = (max_x - min_x).min(max_y - min_y);
                short_side / 2.0 * self.roof_pitch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_outline_is_centered_on_centroid() {
        let house = CustomHouse::from_lot_outline(&square(10.0, 20.0, 30.0)).unwrap();
        assert!((house.position.x - 25.0).abs() < 1e-9);
        assert!((house.position.y - 35.0).abs() < 1e-9);
        let (min_x, min_y, max_x, max_y) = house.local_bounds();
        assert!((min_x + 15.0).abs() < 1e-9 && (max_x - 15.0).abs() < 1e-9);
        assert!((min_y + 15.0).abs() < 1e-9 && (max_y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_point_in_lot_coordinates() {
        let house = CustomHouse::from_lot_outline(&square(10.0, 20.0, 30.0)).unwrap();
        assert!(house.contains_point(&Point::new(12.0, 22.0)));
        assert!(!house.contains_point(&Point::new(5.0, 22.0)));
    }

    #[test]
    fn test_roof_rise_follows_pitch() {
        let mut house = CustomHouse::from_lot_outline(&square(0.0, 0.0, 20.0)).unwrap();
        assert!((house.roof_rise() - 5.0).abs() < 1e-9);
        house.roof = RoofType::Flat;
        assert_eq!(house.roof_rise(), 0.0);
    }

    #[test]
    fn test_wall_height_range() {
        assert!(CustomHouse::validate_wall_height(10.0).is_ok());
        assert!(CustomHouse::validate_wall_height(0.0).is_err());
        assert!(CustomHouse::validate_wall_height(100.0).is_err());
    }
}
