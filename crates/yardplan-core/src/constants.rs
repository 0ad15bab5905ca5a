//! Shared constants for the planner.

/// Grid spacing used for snapping, in feet.
pub const GRID_SIZE_FT: f64 = 1.0;

/// A major grid line is drawn every this many grid cells.
pub const MAJOR_GRID_EVERY: u32 = 10;

/// Screen pixels per foot at zoom 1.0.
pub const PIXELS_PER_FOOT: f64 = 8.0;

/// 3D scene units per foot.
pub const WORLD_UNITS_PER_FOOT: f32 = 1.0;

/// Default rectangular lot width, in feet.
pub const DEFAULT_LOT_WIDTH_FT: f64 = 100.0;

/// Default rectangular lot depth, in feet.
pub const DEFAULT_LOT_DEPTH_FT: f64 = 150.0;

/// Zoom limits for the 2D view.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 20.0;

/// Multiplicative step for zoom in/out.
pub const ZOOM_STEP: f64 = 1.2;

/// Fraction of the canvas kept free around the lot when fitting the view.
pub const VIEW_PADDING: f64 = 0.05;

/// Default 2D canvas size in pixels.
pub const DEFAULT_CANVAS_WIDTH_PX: f64 = 1200.0;
pub const DEFAULT_CANVAS_HEIGHT_PX: f64 = 800.0;

/// Default custom house wall height, in feet.
pub const DEFAULT_WALL_HEIGHT_FT: f64 = 10.0;

/// Accepted custom house wall height range, in feet.
pub const MIN_WALL_HEIGHT_FT: f64 = 4.0;
pub const MAX_WALL_HEIGHT_FT: f64 = 60.0;

/// Default time of day, in hours.
pub const DEFAULT_TIME_OF_DAY: f64 = 12.0;

/// Default site location (used when no configuration is present).
pub const DEFAULT_LATITUDE: f64 = 40.0;
pub const DEFAULT_LONGITUDE: f64 = -75.0;

/// Tolerance used by geometry predicates.
pub const GEOMETRY_EPSILON: f64 = 1e-9;
