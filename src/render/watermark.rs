//! Export watermark: a text label rasterized through `usvg`/`resvg`.

use std::sync::{Arc, OnceLock};

use crate::effects::composite::over_in_place;
use crate::foundation::error::{CutframeError, CutframeResult};

pub(crate) const FONT_SIZE_RATIO: f64 = 0.04;
pub(crate) const MARGIN_RATIO: f64 = 0.03;
const FILL_OPACITY: f64 = 0.5;

/// Bundled so the label renders on hosts without system fonts.
const LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/Tuffy.ttf");
const LABEL_FAMILY: &str = "Tuffy";

fn label_fontdb() -> Arc<usvg::fontdb::Database> {
    static DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(LABEL_FONT.to_vec());
        db.load_system_fonts();
        db.set_sans_serif_family(LABEL_FAMILY);
        tracing::debug!(faces = db.len(), "loaded watermark fonts");
        Arc::new(db)
    })
    .clone()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Full-frame SVG document holding the label, bottom-right aligned.
pub(crate) fn watermark_svg(text: &str, width: u32, height: u32) -> String {
    let w = f64::from(width);
    let font_size = w * FONT_SIZE_RATIO;
    let margin = w * MARGIN_RATIO;
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{x:.2}" y="{y:.2}" font-family="{LABEL_FAMILY}, sans-serif" font-size="{font_size:.2}" font-weight="bold" text-anchor="end" fill="#ffffff" fill-opacity="{FILL_OPACITY}">{label}</text></svg>"##,
        x = w - margin,
        y = f64::from(height) - margin,
        label = escape_xml(text),
    )
}

/// Rasterize the label into a premultiplied `width x height` layer.
///
/// Returns `None` when the label is blank.
pub(crate) fn rasterize_watermark(
    text: &str,
    width: u32,
    height: u32,
) -> CutframeResult<Option<Vec<u8>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let opts = usvg::Options {
        fontdb: label_fontdb(),
        ..Default::default()
    };
    let svg = watermark_svg(text, width, height);
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| CutframeError::evaluation(format!("watermark svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CutframeError::evaluation("failed to allocate watermark pixmap"))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(Some(pixmap.data().to_vec()))
}

/// Composite the label over a premultiplied frame in place.
pub(crate) fn stamp(frame: &mut [u8], width: u32, height: u32, text: &str) -> CutframeResult<()> {
    match rasterize_watermark(text, width, height)? {
        Some(layer) => over_in_place(frame, &layer, 1.0),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/watermark.rs"]
mod tests;
