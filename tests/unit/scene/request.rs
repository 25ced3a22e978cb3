use super::*;
use crate::foundation::core::Point;
use crate::mask::stroke::PaintMode;
use crate::scene::theme::FractionalBox;

fn theme() -> Theme {
    Theme {
        native: Canvas { width: 40, height: 30 },
        layers: Vec::new(),
        subject_z_index: 0,
        placement: FractionalBox::default(),
        shadow: Default::default(),
        default_adjustments: Adjustments::default(),
    }
}

#[test]
fn new_request_defaults_to_preview_without_stage() {
    let theme = theme();
    let subject = ImageRgba8::transparent(4, 4);
    let req = RenderRequest::new(&theme, &subject, SubjectTransform::default());
    assert_eq!(req.mode, RenderMode::Preview);
    assert!(req.stage.is_none());
    assert!(req.strokes.is_empty());
    assert!(!req.strict_layers);
    req.validate().unwrap();
}

#[test]
fn zero_scale_transform_is_rejected() {
    let theme = theme();
    let subject = ImageRgba8::transparent(4, 4);
    let t = SubjectTransform {
        scale_x: 0.0,
        ..SubjectTransform::default()
    };
    assert!(RenderRequest::new(&theme, &subject, t).validate().is_err());
}

#[test]
fn edit_document_parses_camel_case_json() {
    let doc = EditDocument::from_json_str(
        r#"{
            "transform": {"x": 10, "y": 20, "scaleX": 2, "scaleY": 2},
            "adjustments": {"brightness": 0.1},
            "strokes": [{"points": [{"x": 1, "y": 2}], "radius": 3, "mode": "erase"}],
            "stage": {"width": 400, "height": 600}
        }"#,
    )
    .unwrap();
    let t = doc.transform.unwrap();
    assert_eq!((t.x, t.y, t.scale_x, t.rotation), (10.0, 20.0, 2.0, 0.0));
    assert_eq!(doc.adjustments.brightness, 0.1);
    assert_eq!(doc.strokes[0].points, vec![Point::new(1.0, 2.0)]);
    assert_eq!(doc.strokes[0].mode, PaintMode::Erase);
    assert_eq!(doc.stage, Some(Canvas { width: 400, height: 600 }));
}

#[test]
fn empty_edit_document_is_default() {
    assert_eq!(EditDocument::from_json_str("{}").unwrap(), EditDocument::default());
    assert!(EditDocument::from_json_str("[").is_err());
}
