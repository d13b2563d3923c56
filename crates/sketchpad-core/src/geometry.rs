//! Coordinate transforms between normalized document space and device pixels.
//!
//! Documents store every position as a fraction of the drawable area, so the
//! same sketch renders identically at any canvas size or pixel density. Only
//! the viewport knows about pixels.

use crate::snap::GRID_SIZE;
use kurbo::{Point, Rect, Size};

/// Smallest drawable width in CSS pixels.
pub const MIN_CSS_WIDTH: f64 = 320.0;
/// Smallest drawable height in CSS pixels.
pub const MIN_CSS_HEIGHT: f64 = 280.0;
/// Drawing scale shown to the user (CSS pixels per metre).
pub const PX_PER_METER: f64 = 50.0;

/// The drawable area as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Size of the drawable area in CSS pixels.
    pub css_size: Size,
    /// Device pixel ratio (never below 1).
    pub scale_factor: f64,
    /// Grid cell in CSS pixels.
    pub grid_size: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(800.0, 480.0), 1.0)
    }
}

impl Viewport {
    /// Create a viewport, flooring the size and ratio to their minimums.
    pub fn new(css_size: Size, scale_factor: f64) -> Self {
        Self::with_limits(css_size, scale_factor, Size::new(MIN_CSS_WIDTH, MIN_CSS_HEIGHT), GRID_SIZE)
    }

    /// Create a viewport with a custom minimum CSS size and grid cell.
    pub fn with_limits(css_size: Size, scale_factor: f64, min_css_size: Size, grid_size: f64) -> Self {
        let floor = |v: f64| if v.is_finite() { v.floor() } else { 0.0 };
        let scale_factor = if scale_factor.is_finite() { scale_factor.max(1.0) } else { 1.0 };
        let grid_size = if grid_size.is_finite() && grid_size > 0.0 { grid_size } else { GRID_SIZE };
        Self {
            css_size: Size::new(
                floor(css_size.width).max(min_css_size.width.max(1.0)),
                floor(css_size.height).max(min_css_size.height.max(1.0)),
            ),
            scale_factor,
            grid_size,
        }
    }

    /// Size of the device pixel buffer.
    pub fn device_size(&self) -> Size {
        Size::new(
            (self.css_size.width * self.scale_factor).floor(),
            (self.css_size.height * self.scale_factor).floor(),
        )
    }

    /// Grid cell size in device pixels.
    pub fn grid_px(&self) -> f64 {
        self.grid_size * self.scale_factor
    }

    /// Convert a normalized point to device pixels.
    pub fn to_device(&self, point: Point) -> Point {
        to_device_pixels(point, self.device_size())
    }

    /// Convert device pixels to a normalized, clamped point.
    pub fn to_normalized(&self, device: Point) -> Point {
        to_normalized(device.x, device.y, self.device_size())
    }

    /// Map a pointer position in CSS pixels (relative to the canvas) to device pixels.
    pub fn css_to_device(&self, css: Point) -> Point {
        let device = self.device_size();
        Point::new(
            css.x / self.css_size.width * device.width,
            css.y / self.css_size.height * device.height,
        )
    }

    /// Pointer position in metres for the host's coordinate readout.
    pub fn pointer_readout(&self, device: Point) -> (f64, f64) {
        let scale = PX_PER_METER * self.scale_factor;
        (device.x / scale, device.y / scale)
    }
}

/// Scale a normalized point into device pixels.
pub fn to_device_pixels(point: Point, size: Size) -> Point {
    Point::new(point.x * size.width, point.y * size.height)
}

/// Scale device pixels into normalized space, clamped to the unit square.
pub fn to_normalized(px: f64, py: f64, size: Size) -> Point {
    let x = if size.width > 0.0 { px / size.width } else { 0.0 };
    let y = if size.height > 0.0 { py / size.height } else { 0.0 };
    clamp_unit(Point::new(x, y))
}

/// Clamp both coordinates into [0, 1]. NaN collapses to 0.
pub fn clamp_unit(point: Point) -> Point {
    let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    Point::new(clamp(point.x), clamp(point.y))
}

/// Distance from `p` to the closest point of segment `a`-`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Axis-aligned overlap test. Boxes that only touch count as overlapping.
pub fn boxes_overlap(a: Rect, b: Rect) -> bool {
    let a = a.abs();
    let b = b.abs();
    !(a.x1 < b.x0 || a.x0 > b.x1 || a.y1 < b.y0 || a.y0 > b.y1)
}

/// Inclusive containment test (kurbo's `Rect::contains` excludes the far edges).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    let rect = rect.abs();
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_floors_size_and_ratio() {
        let viewport = Viewport::new(Size::new(100.7, 900.4), 0.5);
        assert_eq!(viewport.css_size, Size::new(MIN_CSS_WIDTH, 900.0));
        assert_eq!(viewport.scale_factor, 1.0);
    }

    #[test]
    fn test_custom_limits() {
        let viewport = Viewport::with_limits(Size::new(10.0, 10.0), 1.0, Size::new(100.0, 50.0), 10.0);
        assert_eq!(viewport.css_size, Size::new(100.0, 50.0));
        assert_eq!(viewport.grid_px(), 10.0);
    }

    #[test]
    fn test_device_size_uses_ratio() {
        let viewport = Viewport::new(Size::new(400.0, 300.0), 1.5);
        assert_eq!(viewport.device_size(), Size::new(600.0, 450.0));
        assert_eq!(viewport.grid_px(), 30.0);
    }

    #[test]
    fn test_to_normalized_clamps() {
        let size = Size::new(800.0, 600.0);
        let samples = [
            (-50.0, 20.0),
            (900.0, 700.0),
            (400.0, -1.0),
            (f64::NAN, 1e9),
            (-1e12, 300.0),
        ];
        for (x, y) in samples {
            let p = to_normalized(x, y, size);
            assert!((0.0..=1.0).contains(&p.x), "x out of range for ({x}, {y})");
            assert!((0.0..=1.0).contains(&p.y), "y out of range for ({x}, {y})");
        }
    }

    #[test]
    fn test_round_trip() {
        let size = Size::new(1234.0, 567.0);
        for i in 0..=20 {
            for j in 0..=20 {
                let p = Point::new(i as f64 / 20.0, j as f64 / 20.0);
                let px = to_device_pixels(p, size);
                let back = to_normalized(px.x, px.y, size);
                assert!((back.x - p.x).abs() < 1e-12);
                assert!((back.y - p.y).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_css_to_device() {
        let viewport = Viewport::new(Size::new(400.0, 300.0), 2.0);
        let device = viewport.css_to_device(Point::new(100.0, 150.0));
        assert_eq!(device, Point::new(200.0, 300.0));
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_segment_distance(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        // Past the end clamps to the endpoint.
        assert!((point_segment_distance(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        // Degenerate segment.
        assert!((point_segment_distance(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_boxes_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(boxes_overlap(a, Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(boxes_overlap(a, Rect::new(10.0, 0.0, 20.0, 10.0)), "touching edges overlap");
        assert!(!boxes_overlap(a, Rect::new(10.5, 0.0, 20.0, 10.0)));
        assert!(!boxes_overlap(a, Rect::new(0.0, 11.0, 10.0, 20.0)));
    }

    #[test]
    fn test_pointer_readout() {
        let viewport = Viewport::new(Size::new(800.0, 480.0), 2.0);
        let (x, y) = viewport.pointer_readout(Point::new(200.0, 100.0));
        assert!((x - 2.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }
}
