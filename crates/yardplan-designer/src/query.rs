//! Read-only view of the design consumed by the renderers.

use crate::designer_state::{DrawingState, SelectionTarget};
use crate::model::{CustomHouse, DesignElement, LotConfiguration, Season};

/// What a renderer may read. Implemented by `DesignerState`; renderers never
/// see the mutable state directly.
pub trait DesignQuery {
    fn elements(&self) -> &[DesignElement];
    fn element(&self, id: u64) -> Option<&DesignElement> {
        self.elements().iter().find(|e| e.id == id)
    }
    fn custom_house(&self) -> Option<&CustomHouse>;
    fn lot(&self) -> &LotConfiguration;
    fn selection(&self) -> Option<SelectionTarget>;
    fn drawing(&self) -> &DrawingState;
    fn season(&self) -> Season;
    /// Hours since midnight, `0.0..=24.0`.
    fn time_of_day(&self) -> f64;
}
