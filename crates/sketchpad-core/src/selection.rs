//! Selection state, hit-testing and drag-move.
//!
//! Hit-testing works in device pixels against the viewport so tolerances scale
//! with the device pixel ratio. Elements are identified by their index in the
//! document; topmost (last inserted) elements win.

use crate::geometry::{Viewport, boxes_overlap, point_segment_distance, rect_contains};
use crate::shapes::{Icon, IconKind, Stroke};
use kurbo::{Point, Rect, Vec2};

/// Earth glyph radius in CSS pixels.
pub const EARTH_RADIUS: f64 = 18.0;
/// Extra hit slop around the earth glyph, in device pixels.
pub const EARTH_HIT_SLOP: f64 = 8.0;
/// Half-size of the square icon hit-box in CSS pixels (also the selection ring radius).
pub const ICON_HITBOX: f64 = 24.0;
/// Padding around rectangles when hit-testing, in CSS pixels.
pub const RECT_HIT_PADDING: f64 = 8.0;
/// Padding around stroke bounds for marquee selection, in CSS pixels.
pub const MARQUEE_PADDING: f64 = 6.0;
/// Smallest line hit distance in device pixels.
pub const MIN_LINE_HIT_DISTANCE: f64 = 10.0;

/// Selected icon and stroke indices, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub icons: Vec<usize>,
    pub strokes: Vec<usize>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty() && self.strokes.is_empty()
    }

    pub fn clear(&mut self) {
        self.icons.clear();
        self.strokes.clear();
    }

    /// Make `index` the only selected icon.
    pub fn select_icon(&mut self, index: usize) {
        self.clear();
        self.icons.push(index);
    }

    /// Make `index` the only selected stroke.
    pub fn select_stroke(&mut self, index: usize) {
        self.clear();
        self.strokes.push(index);
    }

    /// Add or remove an icon, leaving the stroke selection alone.
    pub fn toggle_icon(&mut self, index: usize) {
        toggle(&mut self.icons, index);
    }

    /// Add or remove a stroke, leaving the icon selection alone.
    pub fn toggle_stroke(&mut self, index: usize) {
        toggle(&mut self.strokes, index);
    }

    pub fn contains_icon(&self, index: usize) -> bool {
        self.icons.contains(&index)
    }

    pub fn contains_stroke(&self, index: usize) -> bool {
        self.strokes.contains(&index)
    }

    /// Drop indices that no longer exist.
    pub fn retain_valid(&mut self, icon_count: usize, stroke_count: usize) {
        self.icons.retain(|&i| i < icon_count);
        self.strokes.retain(|&i| i < stroke_count);
    }

    /// Rewrite icon indices after the icons at `removed` were deleted.
    pub fn remap_after_icon_removal(&mut self, removed: &[usize]) {
        remap(&mut self.icons, removed);
    }

    /// Rewrite stroke indices after the strokes at `removed` were deleted.
    pub fn remap_after_stroke_removal(&mut self, removed: &[usize]) {
        remap(&mut self.strokes, removed);
    }
}

fn toggle(list: &mut Vec<usize>, index: usize) {
    if let Some(pos) = list.iter().position(|&i| i == index) {
        list.remove(pos);
    } else {
        list.push(index);
    }
}

fn remap(list: &mut Vec<usize>, removed: &[usize]) {
    list.retain(|i| !removed.contains(i));
    for index in list.iter_mut() {
        let shift = removed.iter().filter(|&&r| r < *index).count();
        *index -= shift;
    }
}

/// Half-size of an icon's square hit-box in device pixels.
pub fn icon_hit_half_size(kind: IconKind, scale_factor: f64) -> f64 {
    match kind {
        IconKind::Earth => EARTH_RADIUS * scale_factor + EARTH_HIT_SLOP,
        _ => ICON_HITBOX * scale_factor,
    }
}

/// Square hit-box of an icon in device pixels.
pub fn icon_bounds_px(icon: &Icon, viewport: &Viewport) -> Rect {
    let center = viewport.to_device(icon.position());
    let half = icon_hit_half_size(icon.kind, viewport.scale_factor);
    Rect::new(center.x - half, center.y - half, center.x + half, center.y + half)
}

/// Topmost icon whose hit-box contains `point` (device pixels).
pub fn hit_test_icon(icons: &[Icon], viewport: &Viewport, point: Point) -> Option<usize> {
    icons
        .iter()
        .enumerate()
        .rev()
        .find(|(_, icon)| rect_contains(icon_bounds_px(icon, viewport), point))
        .map(|(index, _)| index)
}

/// Distance within which a line stroke counts as hit, in device pixels.
pub fn line_hit_threshold(stroke: &Stroke, scale_factor: f64) -> f64 {
    MIN_LINE_HIT_DISTANCE.max(stroke.width * scale_factor * 1.5)
}

/// Whether `point` (device pixels) hits `stroke`.
pub fn stroke_contains(stroke: &Stroke, viewport: &Viewport, point: Point) -> bool {
    let size = viewport.device_size();
    if let Some(rect) = stroke.device_rect(size, 0.0) {
        let pad = RECT_HIT_PADDING * viewport.scale_factor;
        return rect_contains(rect.inflate(pad, pad), point);
    }
    let points = stroke.device_points(size);
    let threshold = line_hit_threshold(stroke, viewport.scale_factor);
    match points.as_slice() {
        [] => false,
        [only] => only.distance(point) <= threshold,
        _ => points
            .windows(2)
            .any(|seg| point_segment_distance(point, seg[0], seg[1]) <= threshold),
    }
}

/// Topmost stroke hit by `point` (device pixels).
pub fn hit_test_stroke(strokes: &[Stroke], viewport: &Viewport, point: Point) -> Option<usize> {
    strokes
        .iter()
        .enumerate()
        .rev()
        .find(|(_, stroke)| stroke_contains(stroke, viewport, point))
        .map(|(index, _)| index)
}

/// Padded stroke bounds used for marquee selection, in device pixels.
pub fn stroke_bounds_px(stroke: &Stroke, viewport: &Viewport) -> Option<Rect> {
    let size = viewport.device_size();
    let scale = viewport.scale_factor;
    if let Some(rect) = stroke.device_rect(size, 0.0) {
        let pad = MARQUEE_PADDING * scale;
        return Some(rect.inflate(pad, pad));
    }
    let points = stroke.device_points(size);
    let first = *points.first()?;
    let bounds = points
        .iter()
        .fold(Rect::from_points(first, first), |acc, p| acc.union_pt(*p));
    let pad = (MARQUEE_PADDING * scale).max(stroke.width * scale * 1.5);
    Some(bounds.inflate(pad, pad))
}

/// Everything whose bounds overlap `marquee` (device pixels, any corner order).
pub fn marquee_select(icons: &[Icon], strokes: &[Stroke], viewport: &Viewport, marquee: Rect) -> Selection {
    let marquee = marquee.abs();
    let icons = icons
        .iter()
        .enumerate()
        .filter(|(_, icon)| boxes_overlap(icon_bounds_px(icon, viewport), marquee))
        .map(|(index, _)| index)
        .collect();
    let strokes = strokes
        .iter()
        .enumerate()
        .filter(|(_, stroke)| stroke_bounds_px(stroke, viewport).is_some_and(|b| boxes_overlap(b, marquee)))
        .map(|(index, _)| index)
        .collect();
    Selection { icons, strokes }
}

/// Snapshot taken when a drag-move starts.
///
/// Every frame recomputes positions from the originals so repeated moves never
/// accumulate rounding drift.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Pointer position at drag start, in device pixels.
    pub start_point: Point,
    /// Current pointer position, in device pixels.
    pub current_point: Point,
    /// Original positions of the dragged icons.
    pub original_icons: Vec<(usize, Point)>,
    /// Original points of the dragged strokes.
    pub original_strokes: Vec<(usize, Vec<Point>)>,
}

impl DragState {
    /// Capture the selected elements. Returns `None` when nothing would move.
    pub fn capture(
        icons: &[Icon],
        strokes: &[Stroke],
        selection: &Selection,
        start_point: Point,
    ) -> Option<Self> {
        let original_icons: Vec<_> = selection
            .icons
            .iter()
            .filter_map(|&i| icons.get(i).map(|icon| (i, icon.position())))
            .collect();
        let original_strokes: Vec<_> = selection
            .strokes
            .iter()
            .filter_map(|&i| strokes.get(i).map(|stroke| (i, stroke.points.clone())))
            .collect();
        if original_icons.is_empty() && original_strokes.is_empty() {
            return None;
        }
        Some(Self {
            start_point,
            current_point: start_point,
            original_icons,
            original_strokes,
        })
    }

    /// Pointer delta in device pixels.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Move the captured elements to follow `current_point`.
    pub fn apply(&mut self, icons: &mut [Icon], strokes: &mut [Stroke], viewport: &Viewport, current_point: Point) {
        self.current_point = current_point;
        let size = viewport.device_size();
        let delta_px = self.delta();
        let delta = Vec2::new(delta_px.x / size.width, delta_px.y / size.height);
        for (index, original) in &self.original_icons {
            if let Some(icon) = icons.get_mut(*index) {
                icon.set_position(*original + delta);
            }
        }
        for (index, original) in &self.original_strokes {
            if let Some(stroke) = strokes.get_mut(*index) {
                stroke.translate_from(original, delta);
            }
        }
    }
}
