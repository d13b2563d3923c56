//! Canvas document and runtime state.
//!
//! `SketchDocument` owns the ordered strokes and icons. Every operation that
//! removes elements takes the selection along and rewrites it, so a selection
//! index can never point past the end of its collection.

use crate::geometry::Viewport;
use crate::selection::Selection;
use crate::shapes::{Icon, IconKind, SketchModel, Stroke};
use crate::tools::{ToolKind, ToolManager};
use kurbo::{Point, Vec2};
use std::fmt;

/// Which collection an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    Icon(usize),
    Stroke(usize),
}

/// The persisted part of the editor: strokes and icons in z-order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SketchDocument {
    strokes: Vec<Stroke>,
    icons: Vec<Icon>,
}

impl SketchDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a host snapshot, repairing out-of-range data.
    pub fn from_model(model: SketchModel) -> Self {
        let model = model.normalized();
        Self {
            strokes: model.strokes,
            icons: model.icons,
        }
    }

    /// Snapshot for persistence.
    pub fn to_model(&self) -> SketchModel {
        SketchModel {
            strokes: self.strokes.clone(),
            icons: self.icons.clone(),
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    /// Mutable access for in-place edits that never add or remove elements.
    pub fn strokes_mut(&mut self) -> &mut [Stroke] {
        &mut self.strokes
    }

    /// Mutable access for in-place edits that never add or remove elements.
    pub fn icons_mut(&mut self) -> &mut [Icon] {
        &mut self.icons
    }

    /// Both collections at once, for drag updates.
    pub fn elements_mut(&mut self) -> (&mut [Icon], &mut [Stroke]) {
        (&mut self.icons, &mut self.strokes)
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.icons.is_empty()
    }

    pub fn push_stroke(&mut self, stroke: Stroke) -> usize {
        self.strokes.push(stroke);
        self.strokes.len() - 1
    }

    pub fn push_icon(&mut self, icon: Icon) -> usize {
        self.icons.push(icon);
        self.icons.len() - 1
    }

    /// Remove every selected element and empty the selection.
    ///
    /// Returns `false` when nothing was selected.
    pub fn remove_selected(&mut self, selection: &mut Selection) -> bool {
        if selection.is_empty() {
            return false;
        }
        let icons = std::mem::take(&mut selection.icons);
        let strokes = std::mem::take(&mut selection.strokes);
        remove_indices(&mut self.icons, &icons);
        remove_indices(&mut self.strokes, &strokes);
        selection.retain_valid(self.icons.len(), self.strokes.len());
        true
    }

    /// Remove a single icon, shifting the selection.
    pub fn remove_icon(&mut self, index: usize, selection: &mut Selection) -> Option<Icon> {
        if index >= self.icons.len() {
            return None;
        }
        let icon = self.icons.remove(index);
        selection.remap_after_icon_removal(&[index]);
        Some(icon)
    }

    /// Remove a single stroke, shifting the selection.
    pub fn remove_stroke(&mut self, index: usize, selection: &mut Selection) -> Option<Stroke> {
        if index >= self.strokes.len() {
            return None;
        }
        let stroke = self.strokes.remove(index);
        selection.remap_after_stroke_removal(&[index]);
        Some(stroke)
    }

    /// Remove the most recent icon, or the most recent stroke when there are no icons.
    pub fn pop_last(&mut self, selection: &mut Selection) -> Option<ElementRef> {
        if let Some(last) = self.icons.len().checked_sub(1) {
            self.remove_icon(last, selection)?;
            return Some(ElementRef::Icon(last));
        }
        if let Some(last) = self.strokes.len().checked_sub(1) {
            self.remove_stroke(last, selection)?;
            return Some(ElementRef::Stroke(last));
        }
        None
    }

    /// Remove everything.
    pub fn clear(&mut self, selection: &mut Selection) {
        self.strokes.clear();
        self.icons.clear();
        selection.clear();
    }

    /// Number of placed earth electrodes.
    pub fn earth_count(&self) -> usize {
        self.icons.iter().filter(|icon| icon.kind == IconKind::Earth).count()
    }

    /// Relabel earth icons in placement order. Returns whether any label changed.
    ///
    /// Earth icons past the end of `labels` keep their current label.
    pub fn relabel_earth(&mut self, labels: &[String]) -> bool {
        let mut changed = false;
        let earths = self.icons.iter_mut().filter(|icon| icon.kind == IconKind::Earth);
        for (icon, desired) in earths.zip(labels) {
            if desired.is_empty() || icon.label.as_deref() == Some(desired.as_str()) {
                continue;
            }
            icon.label = Some(desired.clone());
            changed = true;
        }
        changed
    }
}

fn remove_indices<T>(items: &mut Vec<T>, indices: &[usize]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !indices.contains(&index);
        index += 1;
        keep
    });
}

/// Why an earth electrode could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    /// The host has no measurement rows yet.
    NoMeasurements,
    /// Every measurement row already has an electrode.
    LimitReached,
}

impl PlacementRejection {
    /// Advisory shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            PlacementRejection::NoMeasurements => {
                "There are no earth measurements yet. Add them to the measurement table first."
            }
            PlacementRejection::LimitReached => {
                "There is no measurement for this earth electrode. Add it to the table and try again."
            }
        }
    }
}

impl fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Label used when the host supplies an empty one.
pub fn fallback_earth_label(index: usize) -> String {
    format!("Zemnič {}", index + 1)
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// The document being edited.
    pub document: SketchDocument,
    /// Selected icons and strokes.
    pub selection: Selection,
    /// Tool manager.
    pub tool_manager: ToolManager,
    /// Drawable area.
    pub viewport: Viewport,
    /// Earth electrode labels supplied by the host; its length is the placement limit.
    earth_labels: Vec<String>,
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: SketchDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Set the current tool. Changing tools drops the selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.set_tool(tool);
        self.selection.clear();
    }

    pub fn tool(&self) -> ToolKind {
        self.tool_manager.current_tool
    }

    pub fn earth_labels(&self) -> &[String] {
        &self.earth_labels
    }

    /// Replace the host label list and relabel existing earth icons.
    ///
    /// Returns whether any icon changed.
    pub fn set_earth_labels(&mut self, labels: Vec<String>) -> bool {
        self.earth_labels = labels.into_iter().map(|l| l.trim().to_string()).collect();
        let changed = self.document.relabel_earth(&self.earth_labels);
        if changed {
            log::debug!("Relabeled earth electrodes from {} measurement(s)", self.earth_labels.len());
        }
        changed
    }

    /// Add a stroke and make it the sole selection.
    pub fn add_stroke(&mut self, stroke: Stroke) -> usize {
        let index = self.document.push_stroke(stroke);
        self.selection.select_stroke(index);
        index
    }

    /// Add an icon and make it the sole selection.
    pub fn add_icon(&mut self, icon: Icon) -> usize {
        let index = self.document.push_icon(icon);
        self.selection.select_icon(index);
        index
    }

    /// The earth icon that would be placed at `position`, or why none may be.
    pub fn next_earth(&self, position: Point) -> Result<Icon, PlacementRejection> {
        let limit = self.earth_labels.len();
        if limit == 0 {
            return Err(PlacementRejection::NoMeasurements);
        }
        let count = self.document.earth_count();
        if count >= limit {
            return Err(PlacementRejection::LimitReached);
        }
        let label = self.earth_labels[count].clone();
        let label = if label.is_empty() { fallback_earth_label(count) } else { label };
        Ok(Icon::earth(position, label, self.tool_manager.earth_rotation_preset))
    }

    /// Delete the selected elements. Returns `false` when nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        self.document.remove_selected(&mut self.selection)
    }

    /// Remove the newest icon, or the newest stroke if there are no icons.
    pub fn undo(&mut self) -> bool {
        self.document.pop_last(&mut self.selection).is_some()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.document.clear(&mut self.selection);
    }

    /// Move the selection by a normalized offset.
    ///
    /// Icons take precedence: strokes move only when no icon is selected.
    pub fn nudge_selected(&mut self, delta: Vec2) -> bool {
        if !self.selection.icons.is_empty() {
            let icons = self.document.icons_mut();
            for &index in &self.selection.icons {
                if let Some(icon) = icons.get_mut(index) {
                    icon.translate(delta);
                }
            }
            return true;
        }
        if !self.selection.strokes.is_empty() {
            let strokes = self.document.strokes_mut();
            for &index in &self.selection.strokes {
                if let Some(stroke) = strokes.get_mut(index) {
                    let originals = stroke.points.clone();
                    stroke.translate_from(&originals, delta);
                }
            }
            return true;
        }
        false
    }

    /// Rotate selected earth icons by 90°. Returns whether any rotated.
    pub fn rotate_selected(&mut self) -> bool {
        let icons = self.document.icons_mut();
        let mut rotated = false;
        for &index in &self.selection.icons {
            if let Some(icon) = icons.get_mut(index) {
                rotated |= icon.rotate_by(90);
            }
        }
        rotated
    }

    /// Index of the selected text icon when exactly one icon is selected and it is text.
    pub fn selected_text_icon(&self) -> Option<usize> {
        match self.selection.icons.as_slice() {
            [index] => self
                .document
                .icons()
                .get(*index)
                .filter(|icon| icon.kind == IconKind::Text)
                .map(|_| *index),
            _ => None,
        }
    }

    /// Replace the text of a text icon.
    pub fn set_text(&mut self, index: usize, text: String) -> bool {
        match self.document.icons_mut().get_mut(index) {
            Some(icon) if icon.kind == IconKind::Text => {
                icon.text = Some(text);
                true
            }
            _ => false,
        }
    }

    /// Replace the document with a host snapshot.
    pub fn load(&mut self, model: SketchModel) {
        self.document = SketchDocument::from_model(model);
        self.selection.clear();
        self.document.relabel_earth(&self.earth_labels);
        log::debug!(
            "Loaded sketch with {} stroke(s) and {} icon(s)",
            self.document.strokes().len(),
            self.document.icons().len()
        );
    }

    /// Current structured model.
    pub fn model(&self) -> SketchModel {
        self.document.to_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SerializableColor, StrokeStyle};

    fn stroke() -> Stroke {
        Stroke::anchored(StrokeStyle::Solid, SerializableColor::ink(), 2.0, Point::new(0.1, 0.1))
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_elements_become_sole_selection() {
        let mut canvas = Canvas::new();
        canvas.add_icon(Icon::air(Point::new(0.5, 0.5)));
        let index = canvas.add_stroke(stroke());
        assert_eq!(canvas.selection.strokes, vec![index]);
        assert!(canvas.selection.icons.is_empty());
    }

    #[test]
    fn test_undo_prefers_icons() {
        let mut canvas = Canvas::new();
        canvas.add_stroke(stroke());
        canvas.add_icon(Icon::air(Point::new(0.5, 0.5)));
        canvas.add_stroke(stroke());
        assert!(canvas.undo());
        assert_eq!(canvas.document.icons().len(), 0);
        assert_eq!(canvas.document.strokes().len(), 2);
        assert!(canvas.undo());
        assert_eq!(canvas.document.strokes().len(), 1);
        assert!(canvas.undo());
        assert!(!canvas.undo());
    }

    #[test]
    fn test_undo_drops_stale_selection() {
        let mut canvas = Canvas::new();
        canvas.add_icon(Icon::air(Point::new(0.1, 0.1)));
        canvas.add_icon(Icon::air(Point::new(0.2, 0.2)));
        canvas.selection.icons = vec![0, 1];
        canvas.undo();
        assert_eq!(canvas.selection.icons, vec![0]);
    }

    #[test]
    fn test_delete_selected_keeps_order() {
        let mut canvas = Canvas::new();
        for i in 0..4 {
            canvas.add_icon(Icon::text(Point::new(0.1 * i as f64, 0.1), format!("t{i}")));
        }
        canvas.add_stroke(stroke());
        canvas.selection.icons = vec![1, 3];
        canvas.selection.strokes = vec![0];
        assert!(canvas.delete_selected());
        let texts: Vec<_> = canvas.document.icons().iter().filter_map(|i| i.text.clone()).collect();
        assert_eq!(texts, vec!["t0", "t2"]);
        assert!(canvas.document.strokes().is_empty());
        assert!(canvas.selection.is_empty());
        assert!(!canvas.delete_selected());
    }

    #[test]
    fn test_remove_icon_shifts_selection() {
        let mut document = SketchDocument::new();
        for _ in 0..3 {
            document.push_icon(Icon::air(Point::ZERO));
        }
        let mut selection = Selection {
            icons: vec![0, 2],
            strokes: vec![],
        };
        document.remove_icon(1, &mut selection);
        assert_eq!(selection.icons, vec![0, 1]);
    }

    #[test]
    fn test_earth_bound() {
        let mut canvas = Canvas::new();
        assert_eq!(
            canvas.next_earth(Point::new(0.5, 0.5)),
            Err(PlacementRejection::NoMeasurements)
        );
        canvas.set_earth_labels(labels(&["E1", "E2"]));
        for _ in 0..2 {
            let icon = canvas.next_earth(Point::new(0.5, 0.5)).unwrap();
            canvas.add_icon(icon);
        }
        assert_eq!(canvas.next_earth(Point::new(0.5, 0.5)), Err(PlacementRejection::LimitReached));
        let names: Vec<_> = canvas.document.icons().iter().filter_map(|i| i.label.clone()).collect();
        assert_eq!(names, vec!["E1", "E2"]);
    }

    #[test]
    fn test_earth_fallback_label_and_preset() {
        let mut canvas = Canvas::new();
        canvas.set_earth_labels(labels(&["  "]));
        canvas.tool_manager.cycle_earth_rotation();
        let icon = canvas.next_earth(Point::new(0.5, 0.5)).unwrap();
        assert_eq!(icon.label.as_deref(), Some("Zemnič 1"));
        assert_eq!(icon.rotation, Some(90));
    }

    #[test]
    fn test_relabel_earth_in_order() {
        let mut canvas = Canvas::new();
        canvas.set_earth_labels(labels(&["A", "B"]));
        canvas.add_icon(canvas.next_earth(Point::new(0.1, 0.1)).unwrap());
        canvas.add_icon(Icon::air(Point::new(0.2, 0.2)));
        canvas.add_icon(canvas.next_earth(Point::new(0.3, 0.3)).unwrap());
        assert!(canvas.set_earth_labels(labels(&["X", "B", "C"])));
        let names: Vec<_> = canvas.document.icons().iter().map(|i| i.label.clone()).collect();
        assert_eq!(names, vec![Some("X".into()), None, Some("B".into())]);
        assert!(!canvas.set_earth_labels(labels(&["X", "B"])));
    }

    #[test]
    fn test_nudge_icons_before_strokes() {
        let mut canvas = Canvas::new();
        canvas.add_stroke(stroke());
        canvas.add_icon(Icon::air(Point::new(0.995, 0.5)));
        canvas.selection.strokes = vec![0];
        assert!(canvas.nudge_selected(Vec2::new(0.01, 0.0)));
        assert_eq!(canvas.document.icons()[0].x, 1.0);
        assert_eq!(canvas.document.strokes()[0].points[0], Point::new(0.1, 0.1));

        canvas.selection.icons.clear();
        assert!(canvas.nudge_selected(Vec2::new(0.0, 0.02)));
        assert!((canvas.document.strokes()[0].points[0].y - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_selected_only_earth() {
        let mut canvas = Canvas::new();
        canvas.set_earth_labels(labels(&["A"]));
        canvas.add_icon(Icon::air(Point::new(0.2, 0.2)));
        assert!(!canvas.rotate_selected());
        canvas.add_icon(canvas.next_earth(Point::new(0.1, 0.1)).unwrap());
        canvas.selection.icons = vec![0, 1];
        for expected in [90, 180, 270, 0] {
            assert!(canvas.rotate_selected());
            assert_eq!(canvas.document.icons()[1].rotation, Some(expected));
        }
    }

    #[test]
    fn test_selected_text_icon() {
        let mut canvas = Canvas::new();
        canvas.add_icon(Icon::text(Point::new(0.1, 0.1), "hello"));
        assert_eq!(canvas.selected_text_icon(), Some(0));
        assert!(canvas.set_text(0, "world".into()));
        assert_eq!(canvas.document.icons()[0].text.as_deref(), Some("world"));
        canvas.add_icon(Icon::air(Point::ZERO));
        assert_eq!(canvas.selected_text_icon(), None);
    }

    #[test]
    fn test_set_tool_clears_selection() {
        let mut canvas = Canvas::new();
        canvas.add_icon(Icon::air(Point::ZERO));
        canvas.set_tool(ToolKind::Rect);
        assert!(canvas.selection.is_empty());
    }

    #[test]
    fn test_load_normalizes() {
        let mut canvas = Canvas::new();
        let model: SketchModel = serde_json::from_str(
            r##"{"strokes":[{"color":"#ff0000","width":3,"style":"rect","points":[{"x":-0.5,"y":0.2},{"x":1.5,"y":0.4}]}],
                "icons":[{"type":"earth","x":2.0,"y":0.5,"rotation":450}]}"##,
        )
        .unwrap();
        canvas.load(model);
        let model = canvas.model();
        assert_eq!(model.strokes[0].points[0], Point::new(0.0, 0.2));
        assert_eq!(model.strokes[0].points[1], Point::new(1.0, 0.4));
        assert_eq!(model.icons[0].x, 1.0);
        assert_eq!(model.icons[0].rotation, Some(90));
    }
}
