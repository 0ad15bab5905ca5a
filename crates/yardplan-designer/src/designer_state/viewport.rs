//! Viewport operations (zoom, pan) for designer state.

use super::{DesignerEvent, DesignerState};

impl DesignerState {
    /// Zooms in by one step.
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.emit(DesignerEvent::Redraw2D);
    }

    /// Zooms out by one step.
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.emit(DesignerEvent::Redraw2D);
    }

    /// Zooms by `factor` about a pixel position (mouse wheel).
    pub fn zoom_at(&mut self, pixel_x: f64, pixel_y: f64, factor: f64) {
        let zoom = self.viewport.zoom() * factor;
        self.viewport.zoom_to_point(pixel_x, pixel_y, zoom);
        self.emit(DesignerEvent::Redraw2D);
    }

    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by_pixels(dx, dy);
        self.emit(DesignerEvent::Redraw2D);
    }

    /// Zoom 1.0, lot centroid at the canvas centre.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.emit(DesignerEvent::Redraw2D);
    }

    /// Fits the whole lot into the canvas.
    pub fn fit_lot(&mut self) {
        self.frame_lot();
        self.emit(DesignerEvent::Redraw2D);
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.viewport.set_canvas_size(width, height);
        self.emit(DesignerEvent::Redraw2D);
    }
}
