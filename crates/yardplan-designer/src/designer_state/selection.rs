//! Selection operations for designer state.

use super::{DesignerEvent, DesignerState, SelectionTarget};
use crate::model::DesignElement;

impl DesignerState {
    /// Replaces the selection. Returns false when nothing changed: while a
    /// drawing is in progress, for unknown targets, or for the same target.
    pub fn select(&mut self, target: Option<SelectionTarget>) -> bool {
        if self.drawing.is_active() {
            tracing::debug!("Selection ignored while drawing");
            return false;
        }
        let exists = match target {
            Some(SelectionTarget::Element(id)) => self.store.contains(id),
            Some(SelectionTarget::CustomHouse) => self.custom_house.is_some(),
            None => true,
        };
        if !exists || self.selection == target {
            return false;
        }
        self.selection = target;
        self.emit(DesignerEvent::SelectionChanged(target));
        self.emit(DesignerEvent::Redraw2D);
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        self.select(None)
    }

    pub fn selected_element(&self) -> Option<&DesignElement> {
        match self.selection {
            Some(SelectionTarget::Element(id)) => self.store.get(id),
            _ => None,
        }
    }

    pub fn is_custom_house_selected(&self) -> bool {
        self.selection == Some(SelectionTarget::CustomHouse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer_state::DrawingTarget;
    use crate::model::ElementKind;

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut state = DesignerState::new();
        assert!(!state.select(Some(SelectionTarget::Element(99))));
        assert!(!state.select(Some(SelectionTarget::CustomHouse)));
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut state = DesignerState::new();
        let a = state.add_element(ElementKind::Shed, None).unwrap();
        let b = state.add_element(ElementKind::Deck, None).unwrap();
        assert!(state.select(Some(SelectionTarget::Element(a))));
        assert_eq!(state.selected_element().map(|e| e.id), Some(a));
        assert!(state.select(Some(SelectionTarget::Element(b))));
        assert_eq!(state.selected_element().map(|e| e.id), Some(b));
    }

    #[test]
    fn test_drawing_suppresses_selection() {
        let mut state = DesignerState::new();
        let a = state.add_element(ElementKind::Shed, None).unwrap();
        state.start_drawing(DrawingTarget::Lot);
        assert!(!state.select(Some(SelectionTarget::Element(a))));
        assert!(state.selected_element().is_none());
    }
}
