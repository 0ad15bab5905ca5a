//! Viewport and coordinate transformation for the 2D view.
//!
//! Handles conversion between pixel coordinates (screen space) and lot
//! coordinates in feet. The lot centroid is drawn at the canvas centre when
//! the pan offset is zero.

use std::fmt;

use yardplan_core::constants::{
    DEFAULT_CANVAS_HEIGHT_PX, DEFAULT_CANVAS_WIDTH_PX, MAX_ZOOM, MIN_ZOOM, PIXELS_PER_FOOT,
    VIEW_PADDING, ZOOM_STEP,
};
use yardplan_core::Point;

/// Represents the viewport transformation state (zoom and pan).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    /// Pan offset in feet.
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    /// Lot centroid in feet.
    origin: Point,
}

impl Viewport {
    /// Creates a new viewport with initial dimensions.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width,
            canvas_height,
            origin: Point::default(),
        }
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the canvas dimensions (typically called when window resizes).
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Sets the lot centroid used as working origin.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Gets the current zoom level (1.0 = `PIXELS_PER_FOOT` pixels per foot).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Pixels per foot at the current zoom.
    pub fn scale(&self) -> f64 {
        self.zoom * PIXELS_PER_FOOT
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    /// Sets the pan offset in feet.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    /// Pans by a screen-space drag delta.
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx / self.scale();
        self.pan_y += dy / self.scale();
    }

    /// Converts pixel coordinates to lot feet.
    ///
    /// ```text
    /// feet = (pixel - canvas_centre) / scale - pan + origin
    /// ```
    pub fn pixel_to_world(&self, pixel_x: f64, pixel_y: f64) -> Point {
        let scale = self.scale();
        let x = (pixel_x - self.canvas_width / 2.0) / scale - self.pan_x + self.origin.x;
        let y = (pixel_y - self.canvas_height / 2.0) / scale - self.pan_y + self.origin.y;
        Point::new(x, y)
    }

    /// Converts lot feet to pixel coordinates.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.scale();
        (
            (x - self.origin.x + self.pan_x) * scale + self.canvas_width / 2.0,
            (y - self.origin.y + self.pan_y) * scale + self.canvas_height / 2.0,
        )
    }

    pub fn world_point_to_pixel(&self, point: &Point) -> (f64, f64) {
        self.world_to_pixel(point.x, point.y)
    }

    /// Lot position shown at the canvas centre.
    pub fn center_world(&self) -> Point {
        Point::new(self.origin.x - self.pan_x, self.origin.y - self.pan_y)
    }

    /// Centers the viewport on a lot position.
    pub fn center_on(&mut self, point: &Point) {
        self.pan_x = self.origin.x - point.x;
        self.pan_y = self.origin.y - point.y;
    }

    /// Zooms while keeping the lot position under `pixel` fixed on screen.
    pub fn zoom_to_point(&mut self, pixel_x: f64, pixel_y: f64, new_zoom: f64) {
        let anchor = self.pixel_to_world(pixel_x, pixel_y);
        self.set_zoom(new_zoom);
        let scale = self.scale();
        self.pan_x = (pixel_x - self.canvas_width / 2.0) / scale - (anchor.x - self.origin.x);
        self.pan_y = (pixel_y - self.canvas_height / 2.0) / scale - (anchor.y - self.origin.y);
    }

    /// Fits a box in feet into the canvas, reserving `padding` of each side.
    pub fn fit_to_bounds(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64, padding: f64) {
        if min_x >= max_x || min_y >= max_y {
            return;
        }
        let padding_factor = 1.0 - padding * 2.0;
        let zoom_x = self.canvas_width * padding_factor / ((max_x - min_x) * PIXELS_PER_FOOT);
        let zoom_y = self.canvas_height * padding_factor / ((max_y - min_y) * PIXELS_PER_FOOT);
        self.set_zoom(zoom_x.min(zoom_y));
        self.center_on(&Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0));
    }

    /// Fits with the default padding.
    pub fn fit_to_view(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.fit_to_bounds(min_x, min_y, max_x, max_y, VIEW_PADDING);
    }

    /// Resets to zoom 1.0 with the origin centred.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1} ft, {:.1} ft)",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH_PX, DEFAULT_CANVAS_HEIGHT_PX)
    }
}
