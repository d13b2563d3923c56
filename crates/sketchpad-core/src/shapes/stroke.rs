//! Stroke element: lines and rectangles.

use super::SerializableColor;
use crate::geometry::{clamp_unit, to_device_pixels};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default stroke width in CSS pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
/// Widths offered by the toolbar.
pub const STROKE_WIDTH_RANGE: std::ops::RangeInclusive<f64> = 1.0..=8.0;

/// How a stroke's points are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Rect,
    RectSquare,
}

impl StrokeStyle {
    /// Rectangle styles store two opposite corners instead of a polyline.
    pub fn is_rect(self) -> bool {
        matches!(self, StrokeStyle::Rect | StrokeStyle::RectSquare)
    }
}

/// A drawn line or rectangle. Points are normalized to the drawable area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: SerializableColor,
    pub width: f64,
    pub style: StrokeStyle,
    pub points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke anchored at `anchor` (stored twice so it always has two points).
    pub fn anchored(style: StrokeStyle, color: SerializableColor, width: f64, anchor: Point) -> Self {
        let anchor = clamp_unit(anchor);
        Self {
            color,
            width: sanitize_width(width),
            style,
            points: vec![anchor, anchor],
        }
    }

    /// Replace the free end of the stroke.
    pub fn set_end(&mut self, end: Point) {
        let end = clamp_unit(end);
        match self.points.len() {
            0 => self.points.extend([end, end]),
            1 => self.points.push(end),
            n => self.points[n - 1] = end,
        }
    }

    /// Points in device pixels.
    pub fn device_points(&self, size: Size) -> Vec<Point> {
        self.points.iter().map(|p| to_device_pixels(*p, size)).collect()
    }

    /// The rectangle drawn for rect styles, in device pixels.
    ///
    /// `rect_square` is derived here from the two stored corners. The result is
    /// never thinner than `min_side`. Returns `None` for line styles or when
    /// the stroke has no points.
    pub fn device_rect(&self, size: Size, min_side: f64) -> Option<Rect> {
        if !self.style.is_rect() {
            return None;
        }
        let first = *self.points.first()?;
        let last = self.points.get(1).copied().unwrap_or(first);
        let p0 = to_device_pixels(first, size);
        let mut p1 = to_device_pixels(last, size);
        if self.style == StrokeStyle::RectSquare {
            p1 = square_corner(p0, p1);
        }
        let rect = Rect::from_points(p0, p1);
        Some(Rect::new(
            rect.x0,
            rect.y0,
            rect.x0 + rect.width().max(min_side),
            rect.y0 + rect.height().max(min_side),
        ))
    }

    /// Move every point by `delta` from a snapshot of original points, clamping each.
    pub fn translate_from(&mut self, originals: &[Point], delta: Vec2) {
        self.points = originals.iter().map(|p| clamp_unit(*p + delta)).collect();
    }

    /// Repair loaded data: clamp points and replace unusable widths.
    pub fn normalize(&mut self) {
        for point in &mut self.points {
            *point = clamp_unit(*point);
        }
        self.width = sanitize_width(self.width);
    }
}

/// Opposite corner of the square anchored at `anchor` and dragged to `corner`.
///
/// The side is the longer of the two drag extents; the shorter dimension is
/// extended in the direction of the drag, and a zero extent grows in the
/// positive direction.
pub fn square_corner(anchor: Point, corner: Point) -> Point {
    let delta = corner - anchor;
    let side = delta.x.abs().max(delta.y.abs());
    let sign = |v: f64| if v < 0.0 { -1.0 } else { 1.0 };
    Point::new(anchor.x + sign(delta.x) * side, anchor.y + sign(delta.y) * side)
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        DEFAULT_STROKE_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_serializes_snake_case() {
        let json = serde_json::to_string(&StrokeStyle::RectSquare).unwrap();
        assert_eq!(json, "\"rect_square\"");
        let style: StrokeStyle = serde_json::from_str("\"dashed\"").unwrap();
        assert_eq!(style, StrokeStyle::Dashed);
    }

    #[test]
    fn test_stroke_json_shape() {
        let stroke = Stroke::anchored(
            StrokeStyle::Solid,
            SerializableColor::ink(),
            2.0,
            Point::new(0.25, 0.5),
        );
        let value = serde_json::to_value(&stroke).unwrap();
        assert_eq!(value["color"], "#0f172a");
        assert_eq!(value["style"], "solid");
        assert_eq!(value["points"][0]["x"], 0.25);
        assert_eq!(value["points"][1]["y"], 0.5);
    }

    #[test]
    fn test_square_corner_extends_shorter_side() {
        let anchor = Point::new(100.0, 100.0);
        assert_eq!(square_corner(anchor, Point::new(160.0, 120.0)), Point::new(160.0, 160.0));
        assert_eq!(square_corner(anchor, Point::new(80.0, 10.0)), Point::new(10.0, 10.0));
        // Zero extent grows in the positive direction.
        assert_eq!(square_corner(anchor, Point::new(100.0, 140.0)), Point::new(140.0, 140.0));
    }

    #[test]
    fn test_rect_square_device_rect_is_square() {
        let size = Size::new(800.0, 600.0);
        let cases = [
            (Point::new(0.1, 0.1), Point::new(0.4, 0.2)),
            (Point::new(0.5, 0.5), Point::new(0.45, 0.1)),
            (Point::new(0.3, 0.3), Point::new(0.3, 0.6)),
            (Point::new(0.9, 0.2), Point::new(0.2, 0.25)),
        ];
        for (a, b) in cases {
            let mut stroke = Stroke::anchored(StrokeStyle::RectSquare, SerializableColor::ink(), 2.0, a);
            stroke.set_end(b);
            let rect = stroke.device_rect(size, 1.0).unwrap();
            assert!((rect.width() - rect.height()).abs() < 1e-9, "not square for {a:?} {b:?}");
            let pa = to_device_pixels(a, size);
            let pb = to_device_pixels(b, size);
            let longer = (pb.x - pa.x).abs().max((pb.y - pa.y).abs());
            assert!((rect.width() - longer).abs() < 1e-9);
        }
    }

    #[test]
    fn test_device_rect_minimum_side() {
        let stroke = Stroke::anchored(StrokeStyle::Rect, SerializableColor::ink(), 2.0, Point::new(0.5, 0.5));
        let rect = stroke.device_rect(Size::new(100.0, 100.0), 1.0).unwrap();
        assert_eq!(rect.width(), 1.0);
        assert_eq!(rect.height(), 1.0);
    }

    #[test]
    fn test_line_has_no_device_rect() {
        let stroke = Stroke::anchored(StrokeStyle::Dashed, SerializableColor::ink(), 2.0, Point::ZERO);
        assert!(stroke.device_rect(Size::new(100.0, 100.0), 1.0).is_none());
    }

    #[test]
    fn test_translate_from_clamps() {
        let mut stroke = Stroke::anchored(StrokeStyle::Solid, SerializableColor::ink(), 2.0, Point::new(0.9, 0.5));
        stroke.set_end(Point::new(0.95, 0.6));
        let originals = stroke.points.clone();
        stroke.translate_from(&originals, Vec2::new(0.2, -0.1));
        assert_eq!(stroke.points, vec![Point::new(1.0, 0.4), Point::new(1.0, 0.5)]);
    }

    #[test]
    fn test_normalize_repairs_width_and_points() {
        let mut stroke = Stroke {
            color: SerializableColor::ink(),
            width: f64::NAN,
            style: StrokeStyle::Solid,
            points: vec![Point::new(-1.0, 2.0)],
        };
        stroke.normalize();
        assert_eq!(stroke.width, DEFAULT_STROKE_WIDTH);
        assert_eq!(stroke.points, vec![Point::new(0.0, 1.0)]);
    }
}
