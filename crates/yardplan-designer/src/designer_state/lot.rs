//! Lot configuration operations.

use yardplan_core::{Point, Result};

use super::{DesignerEvent, DesignerState};
use crate::model::LotConfiguration;

impl DesignerState {
    /// Switches to a rectangular lot. Any polygon is discarded.
    pub fn set_lot_rectangle(&mut self, width: f64, depth: f64) -> Result<()> {
        let lot = LotConfiguration::rectangle(width, depth)?;
        self.apply_lot(lot);
        Ok(())
    }

    /// Switches to a polygon lot, stored counter-clockwise. The rectangle
    /// dimensions are discarded.
    pub fn set_lot_polygon(&mut self, points: &[Point]) -> Result<()> {
        let lot = LotConfiguration::polygon(points)?;
        self.apply_lot(lot);
        Ok(())
    }

    pub(crate) fn apply_lot(&mut self, lot: LotConfiguration) {
        let (width, depth) = lot.extent();
        tracing::info!(
            "Lot set to {} ({:.1} x {:.1} ft, {:.0} sq ft)",
            if lot.is_custom_shape() { "polygon" } else { "rectangle" },
            width,
            depth,
            lot.area()
        );
        self.lot = lot;
        self.frame_lot();
        self.emit(DesignerEvent::LotChanged);
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DesignQuery;

    #[test]
    fn test_rejects_bad_dimensions_without_change() {
        let mut state = DesignerState::new();
        assert!(state.set_lot_rectangle(-5.0, 20.0).is_err());
        assert_eq!(state.lot(), &LotConfiguration::default());
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_lot_change_moves_viewport_origin() {
        let mut state = DesignerState::new();
        state.set_lot_rectangle(60.0, 40.0).unwrap();
        assert_eq!(state.viewport.origin(), Point::new(30.0, 20.0));
        assert!(state.take_events().contains(&DesignerEvent::LotChanged));
    }
}
