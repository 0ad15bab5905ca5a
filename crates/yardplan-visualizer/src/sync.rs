//! Keeps the scene in step with designer events.

use crate::scene::Scene;
use yardplan_designer::{DesignQuery, DesignerEvent};

/// What the caller has to do after a batch of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Scene geometry changed.
    pub redraw: bool,
    /// Season or time changed; the sun must be recomputed.
    pub relight: bool,
}

impl SyncOutcome {
    fn merge(self, other: SyncOutcome) -> SyncOutcome {
        SyncOutcome {
            redraw: self.redraw || other.redraw,
            relight: self.relight || other.relight,
        }
    }
}

/// Maps designer events onto explicit scene edits.
pub struct SceneSync;

impl SceneSync {
    pub fn apply(scene: &mut Scene, event: &DesignerEvent, query: &dyn DesignQuery) -> SyncOutcome {
        let geometry = SyncOutcome {
            redraw: true,
            relight: false,
        };
        // Seasonal updates arrive before LightingChanged
        if scene.season() != query.season() {
            scene.set_season(query.season());
        }
        match event {
            DesignerEvent::ElementAdded(id) | DesignerEvent::ElementUpdated(id) => {
                match query.element(*id) {
                    Some(element) => {
                        scene.add_element(element);
                    }
                    None => {
                        tracing::debug!("Event for element {} that no longer exists", id);
                        scene.remove_element(*id);
                    }
                }
                geometry
            }
            DesignerEvent::ElementRemoved(id) => {
                scene.remove_element(*id);
                geometry
            }
            DesignerEvent::CustomHouseSet => {
                scene.set_custom_house(query.custom_house());
                geometry
            }
            DesignerEvent::CustomHouseRemoved => {
                scene.set_custom_house(None);
                geometry
            }
            DesignerEvent::LotChanged => {
                // The world origin moves with the lot centroid
                scene.rebuild(query);
                geometry
            }
            DesignerEvent::DesignReplaced => {
                scene.rebuild(query);
                SyncOutcome {
                    redraw: true,
                    relight: true,
                }
            }
            DesignerEvent::LightingChanged => {
                scene.set_season(query.season());
                SyncOutcome {
                    redraw: true,
                    relight: true,
                }
            }
            DesignerEvent::SelectionChanged(selection) => {
                scene.set_selection(*selection);
                geometry
            }
            DesignerEvent::ViewModeChanged(_) | DesignerEvent::Redraw2D => SyncOutcome::default(),
        }
    }

    pub fn apply_all(
        scene: &mut Scene,
        events: &[DesignerEvent],
        query: &dyn DesignQuery,
    ) -> SyncOutcome {
        events
            .iter()
            .fold(SyncOutcome::default(), |acc, event| {
                acc.merge(Self::apply(scene, event, query))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneAssets;
    use yardplan_designer::{AutoConfirm, DesignerState, ElementKind, Season};

    fn synced(state: &mut DesignerState, scene: &mut Scene) -> SyncOutcome {
        let events = state.take_events();
        SceneSync::apply_all(scene, &events, &*state)
    }

    #[test]
    fn test_add_and_delete_flow_through() {
        let mut state = DesignerState::new();
        let mut scene = Scene::new(SceneAssets::default());
        scene.rebuild(&state);

        let id = state.add_element(ElementKind::Shed, None).unwrap();
        assert!(synced(&mut state, &mut scene).redraw);
        assert!(scene.element_node(id).is_some());

        state.delete_element(id, &mut AutoConfirm).unwrap();
        synced(&mut state, &mut scene);
        assert!(scene.element_node(id).is_none());
        assert_eq!(scene.dispose_count(), 1);
    }

    #[test]
    fn test_season_change_requests_relight() {
        let mut state = DesignerState::new();
        let mut scene = Scene::new(SceneAssets::default());
        scene.rebuild(&state);
        state.add_element(ElementKind::Tree, None).unwrap();
        synced(&mut state, &mut scene);

        state.set_season(Season::Winter);
        let outcome = synced(&mut state, &mut scene);
        assert!(outcome.relight);
        assert_eq!(scene.season(), Season::Winter);
        assert_eq!(scene.element_count(), 1);
        assert_eq!(scene.dispose_count(), 0);
    }

    #[test]
    fn test_lot_change_recentres_scene() {
        let mut state = DesignerState::new();
        let mut scene = Scene::new(SceneAssets::default());
        scene.rebuild(&state);
        state.set_lot_rectangle(40.0, 60.0).unwrap();
        synced(&mut state, &mut scene);
        assert_eq!(scene.lot_extent(), (40.0, 60.0));
        assert!(scene.ground_node().is_some());
    }
}
