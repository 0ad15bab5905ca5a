//! Element operations: add, move, rotate, delete, and custom house edits.

use yardplan_core::units::snap_to_grid;
use yardplan_core::{Error, Point, Result, ValidationError};

use super::{DesignerEvent, DesignerState, SelectionTarget, UserPrompt};
use crate::model::{
    normalize_degrees, parse_hex_color, CustomHouse, ElementData, ElementKind, Position3, RoofType,
};

/// Optional custom house property changes, applied together.
#[derive(Debug, Clone, Default)]
pub struct CustomHouseProperties {
    pub wall_height: Option<f64>,
    pub roof: Option<RoofType>,
    pub roof_pitch: Option<f64>,
    pub wall_color: Option<String>,
    pub roof_color: Option<String>,
}

fn validate_color(value: &str) -> std::result::Result<String, ValidationError> {
    parse_hex_color(value)
        .map(crate::model::to_hex_color)
        .ok_or_else(|| ValidationError::InvalidColor {
            value: value.to_string(),
        })
}

/// Rejects NaN and infinite target coordinates.
fn validate_target(x: f64, y: f64) -> std::result::Result<Point, ValidationError> {
    let x = ValidationError::require_range("X", x, f64::MIN, f64::MAX)?;
    let y = ValidationError::require_range("Y", y, f64::MIN, f64::MAX)?;
    Ok(Point::new(x, y))
}

fn validate_rotation(degrees: f64) -> std::result::Result<f64, ValidationError> {
    if degrees.is_finite() {
        Ok(normalize_degrees(degrees))
    } else {
        Err(ValidationError::OutOfRange {
            field: "Rotation".to_string(),
            value: degrees,
            min: f64::MIN,
            max: f64::MAX,
        })
    }
}

impl DesignerState {
    /// Adds an element of `kind` at the viewport centre and selects it.
    ///
    /// Vegetation without data gets the catalog default species; a known
    /// species sets the footprint to its canopy and mature height.
    pub fn add_element(&mut self, kind: ElementKind, data: Option<ElementData>) -> Result<u64> {
        if self.drawing.is_active() {
            return Err(ValidationError::DrawingActive.into());
        }

        let mut data = match data {
            Some(data) => data,
            None if kind.is_vegetation() => self
                .catalog
                .default_for(kind)
                .map(|s| ElementData::Plant(s.to_plant_data()))
                .unwrap_or_default(),
            None => ElementData::None,
        };

        let mut footprint = kind.descriptor().footprint;
        let mut name = None;
        if let ElementData::Plant(plant) = &mut data {
            if let Some(species) = self.catalog.get(&plant.species) {
                plant.is_tree = species.is_tree;
                plant.canopy_diameter = species.canopy_diameter;
                plant.mature_height = species.mature_height;
                name = Some(species.common_name.clone());
            }
            if plant.canopy_diameter > 0.0 && plant.mature_height > 0.0 {
                footprint.width = plant.canopy_diameter;
                footprint.depth = plant.canopy_diameter;
                footprint.height = plant.mature_height;
            }
        }

        let view_center = self.viewport.center_world();
        let snapped = Point::new(snap_to_grid(view_center.x), snap_to_grid(view_center.y));
        let center = self
            .lot
            .clamp_center(snapped, footprint.width / 2.0, footprint.depth / 2.0);

        let element = self.store.create(kind);
        element.position = Position3::new(center.x, center.y, 0.0);
        element.footprint = footprint;
        element.data = data;
        if let Some(name) = name {
            element.name = name;
        }
        let id = element.id;
        tracing::info!("Added {} #{} at ({:.1}, {:.1})", kind, id, center.x, center.y);

        self.selection = Some(SelectionTarget::Element(id));
        self.emit(DesignerEvent::ElementAdded(id));
        self.emit(DesignerEvent::SelectionChanged(self.selection));
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
        Ok(id)
    }

    /// Snaps and clamps a requested centre for a box of the given half
    /// extents. Polygon lots are only clamped to their bounding box.
    fn constrain_center(&self, requested: Point, half_w: f64, half_d: f64) -> Point {
        let snapped = Point::new(snap_to_grid(requested.x), snap_to_grid(requested.y));
        let clamped = self.lot.clamp_center(snapped, half_w, half_d);
        if self.lot.is_custom_shape() && !self.lot.contains(&clamped) {
            tracing::debug!(
                "Position ({:.1}, {:.1}) lies outside the lot polygon",
                clamped.x,
                clamped.y
            );
        }
        clamped
    }

    /// Moves an element's centre to (`x`, `y`) in feet.
    pub fn move_element(&mut self, id: u64, x: f64, y: f64) -> Result<()> {
        let requested = validate_target(x, y)?;
        let element = self.store.get(id).ok_or(Error::NotFound { id })?;
        let (min_x, min_y, max_x, max_y) = element.bounds();
        let target = self.constrain_center(
            requested,
            (max_x - min_x) / 2.0,
            (max_y - min_y) / 2.0,
        );

        let element = self.store.get_mut(id).ok_or(Error::NotFound { id })?;
        if element.center() == target {
            return Ok(());
        }
        element.position.x = target.x;
        element.position.y = target.y;

        self.emit(DesignerEvent::ElementUpdated(id));
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
        Ok(())
    }

    /// Moves the custom house so its centroid lands on (`x`, `y`).
    pub fn move_custom_house(&mut self, x: f64, y: f64) -> Result<()> {
        let requested = validate_target(x, y)?;
        let house = self
            .custom_house
            .as_ref()
            .ok_or_else(|| Error::other("No custom house to move"))?;
        let (min_x, min_y, max_x, max_y) = house.bounds();
        let box_center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let offset = box_center - house.position;

        let snapped = Point::new(snap_to_grid(requested.x), snap_to_grid(requested.y));
        let clamped = self.constrain_center(
            snapped + offset,
            (max_x - min_x) / 2.0,
            (max_y - min_y) / 2.0,
        );
        let target = clamped - offset;

        if let Some(house) = self.custom_house.as_mut() {
            if house.position == target {
                return Ok(());
            }
            house.position = target;
        }
        self.emit(DesignerEvent::CustomHouseSet);
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
        Ok(())
    }

    /// Sets an element's rotation in degrees, returning the normalized
    /// value. `live` updates (slider drags) do not mark the design modified.
    pub fn rotate_element(&mut self, id: u64, degrees: f64, live: bool) -> Result<f64> {
        let rotation = validate_rotation(degrees)?;
        let element = self.store.get_mut(id).ok_or(Error::NotFound { id })?;
        if !element.descriptor().rotatable {
            return Err(ValidationError::NotRotatable {
                kind: element.kind.to_string(),
            }
            .into());
        }
        element.rotation = rotation;

        self.emit(DesignerEvent::ElementUpdated(id));
        self.emit(DesignerEvent::Redraw2D);
        if !live {
            self.mark_modified();
        }
        Ok(rotation)
    }

    /// Rotates whatever is selected. Returns `None` when nothing is.
    pub fn rotate_selection(&mut self, degrees: f64, live: bool) -> Result<Option<f64>> {
        match self.selection {
            Some(SelectionTarget::Element(id)) => self.rotate_element(id, degrees, live).map(Some),
            Some(SelectionTarget::CustomHouse) => {
                let rotation = validate_rotation(degrees)?;
                let house = self
                    .custom_house
                    .as_mut()
                    .ok_or_else(|| Error::other("No custom house to rotate"))?;
                house.rotation = rotation;
                self.emit(DesignerEvent::CustomHouseSet);
                self.emit(DesignerEvent::Redraw2D);
                if !live {
                    self.mark_modified();
                }
                Ok(Some(rotation))
            }
            None => Ok(None),
        }
    }

    /// Deletes an element after confirmation. Returns `Ok(false)` if the
    /// user cancelled.
    pub fn delete_element(&mut self, id: u64, prompt: &mut dyn UserPrompt) -> Result<bool> {
        let element = self.store.get(id).ok_or(Error::NotFound { id })?;
        if !prompt.confirm(&format!("Delete {}?", element.name)) {
            return Ok(false);
        }
        self.store.remove(id);
        tracing::info!("Deleted element #{}", id);

        if self.selection == Some(SelectionTarget::Element(id)) {
            self.selection = None;
            self.emit(DesignerEvent::SelectionChanged(None));
        }
        self.emit(DesignerEvent::ElementRemoved(id));
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
        Ok(true)
    }

    /// Deletes the selected element or custom house.
    pub fn delete_selection(&mut self, prompt: &mut dyn UserPrompt) -> Result<bool> {
        match self.selection {
            Some(SelectionTarget::Element(id)) => self.delete_element(id, prompt),
            Some(SelectionTarget::CustomHouse) => {
                if !prompt.confirm("Remove the custom house?") {
                    return Ok(false);
                }
                self.selection = None;
                self.emit(DesignerEvent::SelectionChanged(None));
                self.remove_custom_house();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drops the custom house, if any.
    pub fn remove_custom_house(&mut self) -> bool {
        if self.custom_house.take().is_none() {
            return false;
        }
        if self.selection == Some(SelectionTarget::CustomHouse) {
            self.selection = None;
            self.emit(DesignerEvent::SelectionChanged(None));
        }
        self.emit(DesignerEvent::CustomHouseRemoved);
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
        true
    }

    /// Installs `house`, replacing any existing one.
    pub(crate) fn set_custom_house(&mut self, house: CustomHouse) {
        if self.custom_house.is_some() {
            self.emit(DesignerEvent::CustomHouseRemoved);
        }
        self.custom_house = Some(house);
        self.emit(DesignerEvent::CustomHouseSet);
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
    }

    /// Applies property changes to the custom house. Every value is
    /// validated before anything is changed.
    pub fn set_custom_house_properties(&mut self, props: CustomHouseProperties) -> Result<()> {
        if self.custom_house.is_none() {
            return Err(Error::other("No custom house"));
        }
        let wall_height = props
            .wall_height
            .map(CustomHouse::validate_wall_height)
            .transpose()?;
        let roof_pitch = props
            .roof_pitch
            .map(|p| ValidationError::require_range("Roof pitch", p, 0.0, 2.0))
            .transpose()?;
        let wall_color = props.wall_color.as_deref().map(validate_color).transpose()?;
        let roof_color = props.roof_color.as_deref().map(validate_color).transpose()?;

        if let Some(house) = self.custom_house.as_mut() {
            if let Some(h) = wall_height {
                house.wall_height = h;
            }
            if let Some(roof) = props.roof {
                house.roof = roof;
            }
            if let Some(p) = roof_pitch {
                house.roof_pitch = p;
            }
            if let Some(c) = wall_color {
                house.wall_color = c;
            }
            if let Some(c) = roof_color {
                house.roof_color = c;
            }
        }
        self.emit(DesignerEvent::CustomHouseSet);
        self.emit(DesignerEvent::Redraw2D);
        self.mark_modified();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer_state::AutoConfirm;
    use crate::query::DesignQuery;

    struct Decline;

    impl UserPrompt for Decline {
        fn confirm(&mut self, _message: &str) -> bool {
            false
        }
        fn alert(&mut self, _message: &str) {}
    }

    #[test]
    fn test_add_selects_new_element() {
        let mut state = DesignerState::new();
        let id = state.add_element(ElementKind::Shed, None).unwrap();
        assert_eq!(state.selection(), Some(SelectionTarget::Element(id)));
        assert!(state.is_modified);
        assert!(state
            .pending_events()
            .contains(&DesignerEvent::ElementAdded(id)));
    }

    #[test]
    fn test_add_clamps_when_view_is_off_lot() {
        let mut state = DesignerState::new();
        state.viewport.center_on(&Point::new(-500.0, 900.0));
        let id = state.add_element(ElementKind::Garage, None).unwrap();
        let element = state.element(id).unwrap();
        assert_eq!(element.position.x, 12.0);
        assert_eq!(element.position.y, 150.0 - 12.0);
    }

    #[test]
    fn test_move_snaps_to_grid() {
        let mut state = DesignerState::new();
        let id = state.add_element(ElementKind::Shed, None).unwrap();
        state.move_element(id, 20.4, 30.6).unwrap();
        let element = state.element(id).unwrap();
        assert_eq!((element.position.x, element.position.y), (20.0, 31.0));
    }

    #[test]
    fn test_rotate_rejects_vegetation_and_nan() {
        let mut state = DesignerState::new();
        let tree = state.add_element(ElementKind::Tree, None).unwrap();
        assert!(state.rotate_element(tree, 45.0, false).is_err());
        let shed = state.add_element(ElementKind::Shed, None).unwrap();
        assert!(state.rotate_element(shed, f64::NAN, false).is_err());
        assert_eq!(state.rotate_element(shed, -30.0, false).unwrap(), 330.0);
    }

    #[test]
    fn test_live_rotation_does_not_mark_modified() {
        let mut state = DesignerState::new();
        let shed = state.add_element(ElementKind::Shed, None).unwrap();
        state.is_modified = false;
        state.rotate_element(shed, 15.0, true).unwrap();
        assert!(!state.is_modified);
        state.rotate_element(shed, 20.0, false).unwrap();
        assert!(state.is_modified);
    }

    #[test]
    fn test_declined_delete_keeps_element() {
        let mut state = DesignerState::new();
        let id = state.add_element(ElementKind::Deck, None).unwrap();
        assert!(!state.delete_element(id, &mut Decline).unwrap());
        assert!(state.element(id).is_some());
        assert!(state.delete_element(id, &mut AutoConfirm).unwrap());
        assert!(state.element(id).is_none());
        assert!(matches!(
            state.delete_element(id, &mut AutoConfirm),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_house_properties_change_nothing() {
        let mut state = DesignerState::new();
        state.set_custom_house(
            CustomHouse::from_lot_outline(&[
                Point::new(10.0, 10.0),
                Point::new(30.0, 10.0),
                Point::new(30.0, 30.0),
                Point::new(10.0, 30.0),
            ])
            .unwrap(),
        );
        let result = state.set_custom_house_properties(CustomHouseProperties {
            wall_height: Some(12.0),
            wall_color: Some("brick".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(
            state.custom_house().unwrap().wall_height,
            yardplan_core::constants::DEFAULT_WALL_HEIGHT_FT
        );
    }
}
