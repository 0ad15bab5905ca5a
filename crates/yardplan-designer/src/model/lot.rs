//! Lot configuration: the bounded ground area elements are placed on.

use serde::{Deserialize, Serialize};

use yardplan_core::constants::{DEFAULT_LOT_DEPTH_FT, DEFAULT_LOT_WIDTH_FT};
use yardplan_core::geometry::{self, Bounds};
use yardplan_core::{Point, ValidationError};

/// Either a rectangle anchored at the origin or a free-form polygon.
///
/// Only one representation exists at a time; switching replaces the value
/// and with it every field of the previous mode.
#[derive(Debug, Clone, PartialEq)]
pub enum LotConfiguration {
    Rectangle { width: f64, depth: f64 },
    Polygon { points: Vec<Point> },
}

impl Default for LotConfiguration {
    fn default() -> Self {
        Self::Rectangle {
            width: DEFAULT_LOT_WIDTH_FT,
            depth: DEFAULT_LOT_DEPTH_FT,
        }
    }
}

impl LotConfiguration {
    /// Validated rectangular lot.
    pub fn rectangle(width: f64, depth: f64) -> Result<Self, ValidationError> {
        Ok(Self::Rectangle {
            width: ValidationError::require_positive("Lot width", width)?,
            depth: ValidationError::require_positive("Lot depth", depth)?,
        })
    }

    /// Validated polygon lot, stored counter-clockwise.
    pub fn polygon(points: &[Point]) -> Result<Self, ValidationError> {
        Ok(Self::Polygon {
            points: geometry::validate_polygon(points)?,
        })
    }

    pub fn is_custom_shape(&self) -> bool {
        matches!(self, Self::Polygon { .. })
    }

    /// Boundary vertices; a rectangle yields its four corners.
    pub fn outline(&self) -> Vec<Point> {
        match self {
            Self::Rectangle { width, depth } => vec![
                Point::new(0.0, 0.0),
                Point::new(*width, 0.0),
                Point::new(*width, *depth),
                Point::new(0.0, *depth),
            ],
            Self::Polygon { points } => points.clone(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Rectangle { width, depth } => (0.0, 0.0, *width, *depth),
            Self::Polygon { points } => geometry::bounds(points),
        }
    }

    /// Working origin for every feet to pixel/world transform.
    pub fn centroid(&self) -> Point {
        match self {
            Self::Rectangle { width, depth } => Point::new(width / 2.0, depth / 2.0),
            Self::Polygon { points } => geometry::centroid(points),
        }
    }

    /// Extent along x and y of the bounding box.
    pub fn extent(&self) -> (f64, f64) {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        (max_x - min_x, max_y - min_y)
    }

    pub fn area(&self) -> f64 {
        match self {
            Self::Rectangle { width, depth } => width * depth,
            Self::Polygon { points } => geometry::signed_area(points).abs(),
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        match self {
            Self::Rectangle { width, depth } => {
                point.x >= 0.0 && point.x <= *width && point.y >= 0.0 && point.y <= *depth
            }
            Self::Polygon { points } => geometry::point_in_polygon(point, points),
        }
    }

    /// Clamps a centre point so a `half_w` x `half_d` box stays inside the
    /// lot's bounding box. Boxes larger than the lot are centred on it.
    pub fn clamp_center(&self, center: Point, half_w: f64, half_d: f64) -> Point {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        let clamp_axis = |v: f64, lo: f64, hi: f64, half: f64| {
            if hi - lo <= half * 2.0 {
                (lo + hi) / 2.0
            } else {
                v.clamp(lo + half, hi - half)
            }
        };
        Point::new(
            clamp_axis(center.x, min_x, max_x, half_w),
            clamp_axis(center.y, min_y, max_y, half_d),
        )
    }

    pub fn to_data(&self) -> LotConfigurationData {
        match self {
            Self::Rectangle { width, depth } => LotConfigurationData {
                width: *width,
                depth: *depth,
                is_custom_shape: false,
                polygon: Vec::new(),
            },
            Self::Polygon { points } => LotConfigurationData {
                width: 0.0,
                depth: 0.0,
                is_custom_shape: true,
                polygon: points.clone(),
            },
        }
    }

    /// Rebuilds a lot from its save-file form, falling back to the default
    /// lot when the stored values are unusable.
    pub fn from_data(data: &LotConfigurationData) -> Self {
        let parsed = if data.is_custom_shape {
            Self::polygon(&data.polygon)
        } else {
            Self::rectangle(data.width, data.depth)
        };
        parsed.unwrap_or_else(|err| {
            tracing::warn!("Stored lot configuration rejected ({}), using default lot", err);
            Self::default()
        })
    }
}

/// Save-file form of the lot. Fields of the inactive mode are written as
/// zero / empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotConfigurationData {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub depth: f64,
    #[serde(default)]
    pub is_custom_shape: bool,
    #[serde(default)]
    pub polygon: Vec<Point>,
}

impl Default for LotConfigurationData {
    fn default() -> Self {
        LotConfiguration::default().to_data()
    }
}
