//! Pointer interaction for the 2D canvas.
//!
//! Translates press/drag/release/hover in pixels into calls on
//! [`DesignerState`]. Element data is never modified here directly.

use yardplan_core::units::snap_to_grid;
use yardplan_core::{Point, Result};

use crate::designer_state::{DesignerState, SelectionTarget};
use crate::query::DesignQuery;

/// Topmost selectable target under `point` (lot feet).
///
/// Elements are tested in reverse draw order against their footprint with
/// the cursor rotated into the element frame; the custom house is tested
/// last with point-in-polygon on its outline.
pub fn hit_test(query: &dyn DesignQuery, point: &Point) -> Option<SelectionTarget> {
    if let Some(element) = query
        .elements()
        .iter()
        .rev()
        .find(|e| e.contains_point(point))
    {
        return Some(SelectionTarget::Element(element.id));
    }
    query
        .custom_house()
        .filter(|house| house.contains_point(point))
        .map(|_| SelectionTarget::CustomHouse)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    target: SelectionTarget,
    /// Cursor position at press, feet.
    grab: Point,
    /// Target position at press, feet.
    origin: Point,
}

/// Mouse state machine for the 2D view.
#[derive(Debug, Clone, Default)]
pub struct CanvasInteraction {
    drag: Option<DragState>,
    /// Screen position of an in-progress pan.
    pan_anchor: Option<(f64, f64)>,
}

impl CanvasInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Primary button press at a pixel position.
    ///
    /// In drawing mode this adds a vertex. Otherwise it selects whatever is
    /// under the cursor (empty space deselects) and arms a drag.
    pub fn press(&mut self, state: &mut DesignerState, pixel_x: f64, pixel_y: f64) -> Result<()> {
        let point = state.viewport.pixel_to_world(pixel_x, pixel_y);
        if state.drawing().is_active() {
            return state.add_drawing_point(point);
        }

        let target = hit_test(&*state, &point);
        state.select(target);
        self.drag = target.and_then(|target| {
            let origin = match target {
                SelectionTarget::Element(id) => state.element(id)?.center(),
                SelectionTarget::CustomHouse => state.custom_house()?.position,
            };
            Some(DragState {
                target,
                grab: point,
                origin,
            })
        });
        Ok(())
    }

    /// Pointer motion with the primary button held.
    pub fn drag(&mut self, state: &mut DesignerState, pixel_x: f64, pixel_y: f64) -> Result<()> {
        let Some(drag) = self.drag else {
            return Ok(());
        };
        let point = state.viewport.pixel_to_world(pixel_x, pixel_y);
        let dx = snap_to_grid(point.x - drag.grab.x);
        let dy = snap_to_grid(point.y - drag.grab.y);
        let x = drag.origin.x + dx;
        let y = drag.origin.y + dy;
        match drag.target {
            SelectionTarget::Element(id) => state.move_element(id, x, y),
            SelectionTarget::CustomHouse => state.move_custom_house(x, y),
        }
    }

    /// Primary button release.
    pub fn release(&mut self) {
        self.drag = None;
    }

    /// Pointer motion without buttons; drives the drawing hover marker.
    pub fn hover(&mut self, state: &mut DesignerState, pixel_x: f64, pixel_y: f64) {
        if state.drawing().is_active() {
            let point = state.viewport.pixel_to_world(pixel_x, pixel_y);
            state.set_drawing_hover(Some(point));
        }
    }

    /// Pointer left the canvas.
    pub fn leave(&mut self, state: &mut DesignerState) {
        state.set_drawing_hover(None);
    }

    /// Secondary/middle button press starts a pan.
    pub fn begin_pan(&mut self, pixel_x: f64, pixel_y: f64) {
        self.pan_anchor = Some((pixel_x, pixel_y));
    }

    pub fn pan_to(&mut self, state: &mut DesignerState, pixel_x: f64, pixel_y: f64) {
        if let Some((ax, ay)) = self.pan_anchor {
            state.pan_by_pixels(pixel_x - ax, pixel_y - ay);
            self.pan_anchor = Some((pixel_x, pixel_y));
        }
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    /// Mouse wheel: zoom about the cursor. Positive `delta` zooms in.
    pub fn wheel(&mut self, state: &mut DesignerState, pixel_x: f64, pixel_y: f64, delta: f64) {
        let factor = if delta > 0.0 {
            yardplan_core::constants::ZOOM_STEP
        } else {
            1.0 / yardplan_core::constants::ZOOM_STEP
        };
        state.zoom_at(pixel_x, pixel_y, factor);
    }
}
