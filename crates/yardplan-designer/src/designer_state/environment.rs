//! Season, time of day and view mode.

use yardplan_core::{Result, ValidationError};

use super::{DesignerEvent, DesignerState, ViewMode};
use crate::model::Season;

impl DesignerState {
    /// Changes the season. Vegetation elements are re-announced because
    /// their seasonal appearance depends on it.
    pub fn set_season(&mut self, season: Season) {
        if self.season == season {
            return;
        }
        self.season = season;
        tracing::info!("Season set to {}", season);

        let vegetation: Vec<u64> = self
            .store
            .iter()
            .filter(|e| e.data.as_plant().is_some())
            .map(|e| e.id)
            .collect();
        for id in vegetation {
            self.emit(DesignerEvent::ElementUpdated(id));
        }
        self.emit(DesignerEvent::LightingChanged);
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
    }

    /// Sets the time of day in hours, `0.0..=24.0`.
    pub fn set_time_of_day(&mut self, hours: f64) -> Result<()> {
        let hours = ValidationError::require_range("Time of day", hours, 0.0, 24.0)?;
        if self.time_of_day == hours {
            return Ok(());
        }
        self.time_of_day = hours;
        self.emit(DesignerEvent::LightingChanged);
        self.mark_modified();
        Ok(())
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode == mode {
            return;
        }
        self.view_mode = mode;
        tracing::debug!("View mode: {:?}", mode);
        self.emit(DesignerEvent::ViewModeChanged(mode));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test]
    fn test_season_change_touches_vegetation_only() {
        let mut state = DesignerState::new();
        let tree = state.add_element(ElementKind::Tree, None).unwrap();
        let shed = state.add_element(ElementKind::Shed, None).unwrap();
        state.take_events();

        state.set_season(Season::Autumn);
        let events = state.take_events();
        assert!(events.contains(&DesignerEvent::ElementUpdated(tree)));
        assert!(!events.contains(&DesignerEvent::ElementUpdated(shed)));
        assert!(events.contains(&DesignerEvent::LightingChanged));
    }

    #[test]
    fn test_time_of_day_range() {
        let mut state = DesignerState::new();
        assert!(state.set_time_of_day(24.0).is_ok());
        assert!(state.set_time_of_day(-1.0).is_err());
        assert!(state.set_time_of_day(25.0).is_err());
    }
}
