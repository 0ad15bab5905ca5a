use yardplan_core::Point;
use yardplan_designer::{
    DesignQuery, DesignerState, DrawingTarget, ElementKind, RoofType, Season,
};

fn sample_design() -> DesignerState {
    let mut state = DesignerState::new();
    for kind in [ElementKind::Shed, ElementKind::Tree, ElementKind::Patio, ElementKind::Fence] {
        state.add_element(kind, None).unwrap();
    }
    let fence = state.elements()[3].id;
    state.move_element(fence, 10.0, 140.0).unwrap();
    state.rotate_element(fence, 90.0, false).unwrap();

    state.start_drawing(DrawingTarget::House);
    for (x, y) in [(30.0, 30.0), (70.0, 30.0), (70.0, 55.0), (45.0, 65.0), (30.0, 55.0)] {
        state.add_drawing_point(Point::new(x, y)).unwrap();
    }
    state.finish_drawing().unwrap();
    state
        .set_custom_house_properties(yardplan_designer::CustomHouseProperties {
            wall_height: Some(18.0),
            roof: Some(RoofType::Hipped),
            ..Default::default()
        })
        .unwrap();
    state.set_season(Season::Winter);
    state.set_time_of_day(16.5).unwrap();
    state
}

#[test]
fn test_save_load_round_trip() {
    let mut original = sample_design();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("yard.json");
    original.save_to_file(&path).unwrap();
    assert!(!original.is_modified);
    assert_eq!(original.display_name(), "yard");

    let mut loaded = DesignerState::new();
    loaded.load_from_file(&path).unwrap();

    assert_eq!(loaded.elements().len(), original.elements().len());
    for (a, b) in original.elements().iter().zip(loaded.elements()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.kind, b.kind);
        assert!((a.position.x - b.position.x).abs() < 1e-9);
        assert!((a.position.y - b.position.y).abs() < 1e-9);
        assert!((a.rotation - b.rotation).abs() < 1e-9);
        assert_eq!(a.data, b.data);
    }

    let (ha, hb) = (original.custom_house().unwrap(), loaded.custom_house().unwrap());
    assert_eq!(ha.outline.len(), hb.outline.len());
    for (p, q) in ha.outline.iter().zip(&hb.outline) {
        assert!(p.distance_to(q) < 1e-9);
    }
    assert_eq!(hb.wall_height, 18.0);
    assert_eq!(hb.roof, RoofType::Hipped);
    assert_eq!(loaded.season(), Season::Winter);
    assert_eq!(loaded.time_of_day(), 16.5);
}

#[test]
fn test_new_ids_continue_after_load() {
    let mut original = sample_design();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("yard.json");
    original.save_to_file(&path).unwrap();

    let mut loaded = DesignerState::new();
    loaded.load_from_file(&path).unwrap();
    let max_id = loaded.elements().iter().map(|e| e.id).max().unwrap();
    let id = loaded.add_element(ElementKind::Plant, None).unwrap();
    assert!(id > max_id);
}

#[test]
fn test_malformed_file_leaves_state_unchanged() {
    let mut state = sample_design();
    let before_elements = state.elements().to_vec();
    let before_lot = state.lot().clone();
    state.take_events();

    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [
        ("truncated.json", r#"{"version": "2.0", "elements": [{"id": 1, "#),
        ("unversioned.json", r#"{"elements": []}"#),
        ("empty.json", r#"{"version": "2.0"}"#),
        ("array.json", "[]"),
    ] {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        assert!(state.load_from_file(&path).is_err(), "{} should fail", name);
    }
    assert!(state.load_from_file(dir.path().join("missing.json")).is_err());

    assert_eq!(state.elements(), before_elements.as_slice());
    assert_eq!(state.lot(), &before_lot);
    assert!(state.custom_house().is_some());
    assert!(state.take_events().is_empty());
}

#[test]
fn test_loads_older_file_with_missing_fields() {
    let json = r#"{
        "version": "1.0",
        "lotConfiguration": {"width": 80, "depth": 60},
        "customHouseData": {
            "x": 40, "y": 30,
            "outline": [{"x": -10, "y": -8}, {"x": 10, "y": -8}, {"x": 10, "y": 8}, {"x": -10, "y": 8}],
            "height": 12
        },
        "elements": [
            {"id": 4, "type": "tree", "x": 20, "y": 20, "data": {"species": "white-oak", "isTree": true}},
            {"id": 5, "type": "hovercraft", "x": 1, "y": 1},
            {"id": 6, "type": "raisedBed", "x": 60, "y": 50, "width": 6}
        ]
    }"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.json");
    std::fs::write(&path, json).unwrap();

    let mut state = DesignerState::new();
    state.load_from_file(&path).unwrap();

    assert_eq!(state.elements().len(), 2);
    assert_eq!(state.custom_house().unwrap().wall_height, 12.0);
    let bed = state.element(6).unwrap();
    assert_eq!(bed.footprint.width, 6.0);
    assert_eq!(bed.footprint.depth, ElementKind::RaisedBed.descriptor().footprint.depth);
    assert!(state.element(4).unwrap().is_tree());
    assert_eq!(state.season(), Season::Summer);
}
