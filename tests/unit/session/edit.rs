use super::*;
use crate::effects::shadow::ShadowConfig;
use crate::scene::theme::{Anchor, FractionalBox};

fn theme() -> Arc<Theme> {
    Arc::new(Theme {
        native: Canvas { width: 800, height: 1200 },
        layers: Vec::new(),
        subject_z_index: 0,
        placement: FractionalBox {
            x: 0.25,
            y: 0.30,
            width: 0.50,
            height: 0.50,
            rotation: 0.0,
            anchor: Anchor::Center,
        },
        shadow: ShadowConfig::default(),
        default_adjustments: Adjustments {
            brightness: 0.05,
            ..Adjustments::IDENTITY
        },
    })
}

fn session() -> EditSession {
    EditSession::new(theme(), Canvas { width: 400, height: 600 }).unwrap()
}

fn subject() -> ImageRgba8 {
    ImageRgba8::transparent(100, 50)
}

#[test]
fn new_session_starts_from_theme_defaults() {
    let s = session();
    assert!(s.subject().is_none());
    assert!(s.transform().is_none());
    assert_eq!(s.adjustments().brightness, 0.05);
    assert!(s.render_request(RenderMode::Preview).is_err());
    assert!(EditSession::new(theme(), Canvas { width: 0, height: 10 }).is_err());
}

#[test]
fn load_subject_seeds_fit_placement() {
    let mut s = session();
    let t = s.load_subject(subject()).unwrap();
    assert_eq!(
        t,
        SubjectTransform {
            x: 100.0,
            y: 280.0,
            scale_x: 2.0,
            scale_y: 2.0,
            rotation: 0.0
        }
    );
    assert_eq!(s.transform(), Some(t));
}

#[test]
fn strokes_are_recorded_in_native_space() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    s.begin_stroke(Point::new(110.0, 290.0), 8.0, PaintMode::Erase).unwrap();
    s.extend_stroke(Point::new(130.0, 290.0));
    let stroke = s.end_stroke().unwrap().clone();
    assert_eq!(stroke.points, vec![Point::new(5.0, 5.0), Point::new(15.0, 5.0)]);
    assert_eq!(stroke.radius, 4.0);
    assert_eq!(stroke.mode, PaintMode::Erase);
    assert_eq!(s.masks().len(), 1);
    assert!(s.end_stroke().is_none());
}

#[test]
fn undo_and_clear() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    for x in [110.0, 120.0] {
        s.begin_stroke(Point::new(x, 290.0), 4.0, PaintMode::Erase).unwrap();
        s.end_stroke();
    }
    assert_eq!(s.masks().len(), 2);
    let popped = s.undo().unwrap();
    assert_eq!(popped.points[0], Point::new(10.0, 5.0));
    assert_eq!(s.masks().len(), 1);
    s.clear_masks();
    assert!(s.masks().is_empty());
    assert!(s.undo().is_none());
}

#[test]
fn strokes_survive_transform_edits_but_not_new_subjects() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    s.begin_stroke(Point::new(110.0, 290.0), 4.0, PaintMode::Restore).unwrap();
    s.end_stroke();

    s.set_transform(SubjectTransform {
        x: 0.0,
        y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 45.0,
    })
    .unwrap();
    assert_eq!(s.masks().strokes()[0].points[0], Point::new(5.0, 5.0));

    let reset = s.reset_transform().unwrap();
    assert_eq!((reset.x, reset.y), (100.0, 280.0));
    assert_eq!(s.masks().len(), 1);

    s.load_subject(subject()).unwrap();
    assert!(s.masks().is_empty());
}

#[test]
fn stroke_requires_subject_and_positive_radius() {
    let mut s = session();
    assert!(s.begin_stroke(Point::ZERO, 4.0, PaintMode::Erase).is_err());
    s.load_subject(subject()).unwrap();
    assert!(s.begin_stroke(Point::ZERO, 0.0, PaintMode::Erase).is_err());
    s.extend_stroke(Point::new(1.0, 1.0));
    assert!(s.end_stroke().is_none());
}

#[test]
fn sliders_clamp_to_ui_range_and_presets_assign_wholesale() {
    let mut s = session();
    s.set_adjustments(Adjustments {
        brightness: 0.9,
        contrast: -80.0,
        vibrance: 0.2,
        warmth: 0.0,
    });
    let a = s.adjustments();
    assert_eq!((a.brightness, a.contrast, a.vibrance), (0.3, -30.0, 0.2));

    s.apply_preset(Preset::Mono);
    assert_eq!(s.adjustments(), Preset::Mono.bundle());
    s.apply_preset(Preset::Original);
    assert!(s.adjustments().is_identity());
}

#[test]
fn render_request_reflects_current_state() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    s.begin_stroke(Point::new(110.0, 290.0), 4.0, PaintMode::Erase).unwrap();
    s.end_stroke();
    let req = s.render_request(RenderMode::Export).unwrap();
    assert_eq!(req.mode, RenderMode::Export);
    assert_eq!(req.stage, Some(Canvas { width: 400, height: 600 }));
    assert_eq!(req.strokes.len(), 1);
    assert_eq!(req.transform, s.transform().unwrap());
    assert_eq!(req.adjustments.brightness, 0.05);
}

#[test]
fn document_roundtrips_through_apply() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    s.begin_stroke(Point::new(110.0, 290.0), 4.0, PaintMode::Erase).unwrap();
    s.end_stroke();
    let doc = s.document();

    let mut other = session();
    other.load_subject(subject()).unwrap();
    other.apply_document(doc.clone()).unwrap();
    assert_eq!(other.document(), doc);
}

#[test]
fn rejected_document_leaves_session_untouched() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    s.begin_stroke(Point::new(110.0, 290.0), 4.0, PaintMode::Erase).unwrap();
    s.end_stroke();
    let before = s.document();

    let mut bad = before.clone();
    bad.stage = Some(Canvas { width: 800, height: 1200 });
    bad.adjustments.brightness = 0.2;
    bad.strokes.clear();
    if let Some(t) = bad.transform.as_mut() {
        t.scale_x = 0.0;
    }
    assert!(s.apply_document(bad.clone()).is_err());
    assert_eq!(s.document(), before);
    assert_eq!(s.stage(), Canvas { width: 400, height: 600 });

    let mut empty = session();
    bad.transform = None;
    assert!(empty.apply_document(bad).is_err());
    assert_eq!(empty.stage(), Canvas { width: 400, height: 600 });
    assert_eq!(empty.adjustments().brightness, 0.05);
}

#[test]
fn stroke_without_finite_samples_is_not_committed() {
    let mut s = session();
    s.load_subject(subject()).unwrap();
    s.begin_stroke(Point::new(f64::NAN, 10.0), 4.0, PaintMode::Erase).unwrap();
    assert!(s.end_stroke().is_none());
    assert!(s.masks().is_empty());
}
