//! Single-line text layout on top of `ab_glyph` outlines.

use ab_glyph::{Font, FontArc, OutlineCurve, PxScale, ScaleFont};
use kurbo::{BezPath, Point};

/// Vertical anchor of a text run, relative to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Origin sits on the ascender line; text hangs below it.
    Top,
    /// Origin sits halfway between ascender and descender.
    Middle,
    /// Origin sits on the descender line; text stands above it.
    Bottom,
}

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Parse font bytes.
pub fn load_font(data: Vec<u8>) -> Result<FontArc, ab_glyph::InvalidFont> {
    FontArc::try_from_vec(data)
}

/// Advance width of `text` in pixels, kerning included.
pub fn measure(font: &FontArc, text: &str, size: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Outline of `text` laid out on one line, in device pixels.
pub fn text_path(
    font: &FontArc,
    text: &str,
    size: f32,
    origin: Point,
    align: TextAlign,
    baseline: Baseline,
) -> BezPath {
    let scaled = font.as_scaled(PxScale::from(size));
    let ascent = scaled.ascent() as f64;
    let descent = scaled.descent() as f64;
    let baseline_y = match baseline {
        Baseline::Top => origin.y + ascent,
        Baseline::Middle => origin.y + (ascent + descent) / 2.0,
        Baseline::Bottom => origin.y + descent,
    };
    let mut caret = match align {
        TextAlign::Left => origin.x,
        TextAlign::Center => origin.x - measure(font, text, size) as f64 / 2.0,
    };
    let h_scale = scaled.h_scale_factor() as f64;
    let v_scale = scaled.v_scale_factor() as f64;

    let mut path = BezPath::new();
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id) as f64;
        }
        if let Some(outline) = font.outline(id) {
            // Font units are y-up; flip onto the baseline.
            let map = |p: ab_glyph::Point| Point::new(caret + p.x as f64 * h_scale, baseline_y - p.y as f64 * v_scale);
            let mut pen: Option<Point> = None;
            for curve in &outline.curves {
                let (start, end) = match curve {
                    OutlineCurve::Line(a, b) => (map(*a), map(*b)),
                    OutlineCurve::Quad(a, _, c) => (map(*a), map(*c)),
                    OutlineCurve::Cubic(a, _, _, d) => (map(*a), map(*d)),
                };
                if pen != Some(start) {
                    if pen.is_some() {
                        path.close_path();
                    }
                    path.move_to(start);
                }
                match curve {
                    OutlineCurve::Line(_, _) => path.line_to(end),
                    OutlineCurve::Quad(_, b, _) => path.quad_to(map(*b), end),
                    OutlineCurve::Cubic(_, b, c, _) => path.curve_to(map(*b), map(*c), end),
                }
                pen = Some(end);
            }
            if pen.is_some() {
                path.close_path();
            }
        }
        caret += scaled.h_advance(id) as f64;
        previous = Some(id);
    }
    path
}
