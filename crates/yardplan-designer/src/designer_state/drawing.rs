//! Outline drawing for polygon lots and the custom house.
//!
//! `Idle -> Drawing` on [`DesignerState::start_drawing`]. A successful
//! [`DesignerState::finish_drawing`] or a cancel returns to `Idle`; a failed
//! finish leaves the drawing and all design data as they were.

use yardplan_core::geometry;
use yardplan_core::units::snap_to_grid;
use yardplan_core::{Point, Result, ValidationError};

use super::{DesignerEvent, DesignerState, DrawingState, DrawingTarget, SelectionTarget};
use crate::model::{CustomHouse, LotConfiguration};

fn snap(point: Point) -> Point {
    Point::new(snap_to_grid(point.x), snap_to_grid(point.y))
}

impl DesignerState {
    /// Enters drawing mode, discarding any drawing already in progress and
    /// clearing the selection.
    pub fn start_drawing(&mut self, target: DrawingTarget) {
        if let Some(previous) = self.drawing.target() {
            tracing::info!("Cancelling {:?} drawing", previous);
        }
        if self.selection.take().is_some() {
            self.emit(DesignerEvent::SelectionChanged(None));
        }
        self.drawing = DrawingState::Drawing {
            target,
            points: Vec::new(),
            hover: None,
        };
        tracing::info!("Started drawing {:?} outline", target);
        self.emit(DesignerEvent::Redraw2D);
    }

    /// Appends a grid-snapped vertex. Repeating the last vertex is a no-op.
    pub fn add_drawing_point(&mut self, point: Point) -> Result<()> {
        let DrawingState::Drawing { points, .. } = &mut self.drawing else {
            return Err(ValidationError::NoDrawing.into());
        };
        let point = snap(point);
        if points.last() == Some(&point) {
            return Ok(());
        }
        points.push(point);
        self.emit(DesignerEvent::Redraw2D);
        Ok(())
    }

    /// Updates the cursor marker of the preview.
    pub fn set_drawing_hover(&mut self, point: Option<Point>) {
        if let DrawingState::Drawing { hover, .. } = &mut self.drawing {
            let snapped = point.map(snap);
            if *hover != snapped {
                *hover = snapped;
                self.emit(DesignerEvent::Redraw2D);
            }
        }
    }

    /// Whether the points drawn so far would be accepted by
    /// [`finish_drawing`](Self::finish_drawing).
    pub fn drawing_preview_valid(&self) -> bool {
        let points = self.drawing.points();
        points.len() >= 3 && geometry::is_valid_polygon(points)
    }

    /// Validates the outline and applies it as the lot or custom house.
    pub fn finish_drawing(&mut self) -> Result<()> {
        let Some(target) = self.drawing.target() else {
            return Err(ValidationError::NoDrawing.into());
        };
        let points = self.drawing.points().to_vec();

        match target {
            DrawingTarget::Lot => {
                let lot = LotConfiguration::polygon(&points)?;
                self.drawing = DrawingState::Idle;
                self.apply_lot(lot);
            }
            DrawingTarget::House => {
                let mut house = CustomHouse::from_lot_outline(&points)?;
                if let Some(old) = &self.custom_house {
                    house.wall_height = old.wall_height;
                    house.roof = old.roof;
                    house.roof_pitch = old.roof_pitch;
                    house.wall_color = old.wall_color.clone();
                    house.roof_color = old.roof_color.clone();
                }
                self.drawing = DrawingState::Idle;
                self.set_custom_house(house);
                self.selection = Some(SelectionTarget::CustomHouse);
                self.emit(DesignerEvent::SelectionChanged(self.selection));
            }
        }
        tracing::info!("Finished {:?} outline with {} points", target, points.len());
        Ok(())
    }

    /// Leaves drawing mode, discarding the points. Returns false if no
    /// drawing was active.
    pub fn cancel_drawing(&mut self) -> bool {
        if !self.drawing.is_active() {
            return false;
        }
        self.drawing = DrawingState::Idle;
        self.emit(DesignerEvent::Redraw2D);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DesignQuery;

    #[test]
    fn test_points_are_snapped_and_deduplicated() {
        let mut state = DesignerState::new();
        state.start_drawing(DrawingTarget::Lot);
        state.add_drawing_point(Point::new(0.2, 0.4)).unwrap();
        state.add_drawing_point(Point::new(-0.3, 0.1)).unwrap();
        state.add_drawing_point(Point::new(10.0, 0.0)).unwrap();
        assert_eq!(
            state.drawing().points(),
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]
        );
        assert!(!state.drawing_preview_valid());
    }

    #[test]
    fn test_add_point_requires_drawing() {
        let mut state = DesignerState::new();
        assert!(state.add_drawing_point(Point::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_house_outline_replaces_house_and_keeps_style() {
        let mut state = DesignerState::new();
        for target_size in [20.0, 30.0] {
            state.start_drawing(DrawingTarget::House);
            for p in [(10.0, 10.0), (10.0 + target_size, 10.0), (10.0, 10.0 + target_size)] {
                state.add_drawing_point(Point::new(p.0, p.1)).unwrap();
            }
            state.finish_drawing().unwrap();
            if let Some(house) = state.custom_house.as_mut() {
                house.wall_height = 15.0;
            }
        }
        let events = state.take_events();
        assert!(events.contains(&DesignerEvent::CustomHouseRemoved));
        assert_eq!(state.custom_house().unwrap().wall_height, 15.0);
        assert_eq!(state.selection(), Some(SelectionTarget::CustomHouse));
    }

    #[test]
    fn test_cancel_discards_points() {
        let mut state = DesignerState::new();
        state.start_drawing(DrawingTarget::House);
        state.add_drawing_point(Point::new(5.0, 5.0)).unwrap();
        assert!(state.cancel_drawing());
        assert!(!state.drawing().is_active());
        assert!(!state.cancel_drawing());
        assert!(state.custom_house().is_none());
    }
}
