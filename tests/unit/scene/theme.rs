use super::*;

const THEME_JSON: &str = r#"{
    "native": {"width": 300, "height": 400},
    "layers": [
        {"image": "front.png", "zIndex": 5},
        {"image": "back.png", "zIndex": 0},
        {"image": "mid.png", "zIndex": 1, "visible": false},
        {"image": "glow.png", "zIndex": 3}
    ],
    "subjectZIndex": 2,
    "placement": {"x": 25, "y": 30, "width": 50, "height": 50, "anchor": "bottom"},
    "shadow": {"enabled": true, "angle": 45, "distance": 8, "blur": 4, "opacity": 0.3}
}"#;

#[test]
fn parses_and_normalizes_legacy_placement() {
    let theme = Theme::from_json_str(THEME_JSON).unwrap();
    assert_eq!(theme.placement.x, 0.25);
    assert_eq!(theme.placement.y, 0.30);
    assert_eq!(theme.placement.width, 0.5);
    assert_eq!(theme.placement.anchor, Anchor::Bottom);
    assert!(theme.default_adjustments.is_identity());
}

#[test]
fn layers_split_around_subject_and_skip_hidden() {
    let theme = Theme::from_json_str(THEME_JSON).unwrap();
    let below: Vec<&str> = theme.layers_below().iter().map(|l| l.image.as_str()).collect();
    let above: Vec<&str> = theme.layers_above().iter().map(|l| l.image.as_str()).collect();
    assert_eq!(below, vec!["back.png"]);
    assert_eq!(above, vec!["glow.png", "front.png"]);
}

#[test]
fn legacy_detection_is_all_or_nothing() {
    let mixed = PlacementBox {
        x: 0.5,
        y: 10.0,
        width: 0.5,
        height: 0.25,
        rotation: 0.0,
        anchor: Anchor::Center,
    };
    let n = mixed.normalize();
    assert_eq!(n.x, 0.005);
    assert_eq!(n.y, 0.1);
    assert_eq!(n.width, 0.005);
    assert_eq!(n.height, 0.0025);

    let fractional = PlacementBox {
        x: 0.1,
        y: 0.2,
        width: 0.5,
        height: 0.25,
        rotation: 15.0,
        anchor: Anchor::Top,
    };
    assert_eq!(
        fractional.normalize(),
        FractionalBox {
            x: 0.1,
            y: 0.2,
            width: 0.5,
            height: 0.25,
            rotation: 15.0,
            anchor: Anchor::Top,
        }
    );
}

#[test]
fn oversized_box_survives_a_json_round_trip() {
    let json = THEME_JSON.replace("\"width\": 50", "\"width\": 150");
    let theme = Theme::from_json_str(&json).unwrap();
    assert_eq!(theme.placement.width, 1.5);

    let again = Theme::from_json_str(&serde_json::to_string(&theme).unwrap()).unwrap();
    let (a, b) = (again.placement, theme.placement);
    for (x, y) in [(a.x, b.x), (a.y, b.y), (a.width, b.width), (a.height, b.height)] {
        assert!((x - y).abs() < 1e-12, "{x} vs {y}");
    }
    assert_eq!(a.anchor, b.anchor);
}

#[test]
fn subject_z_clash_is_rejected() {
    let json = THEME_JSON.replace("\"zIndex\": 3", "\"zIndex\": 2");
    assert!(matches!(
        Theme::from_json_str(&json),
        Err(CutframeError::Validation(_))
    ));
}

#[test]
fn zero_native_size_is_rejected() {
    let json = THEME_JSON.replace("\"width\": 300", "\"width\": 0");
    assert!(Theme::from_json_str(&json).is_err());
}
