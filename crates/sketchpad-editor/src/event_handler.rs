//! Event handling for tool interactions.
//!
//! All positions here are device pixels. Placement and drawing use the
//! grid-snapped pointer; hit-testing, dragging and the marquee use the raw one.

use crate::shortcuts::{EditorAction, ShortcutRegistry};
use kurbo::{Point, Rect, Vec2};
use sketchpad_core::canvas::Canvas;
use sketchpad_core::config::EditorConfig;
use sketchpad_core::input::{Key, Modifiers, MouseButton};
use sketchpad_core::selection::{DragState, hit_test_icon, hit_test_stroke, marquee_select};
use sketchpad_core::shapes::{Icon, Stroke, StrokeStyle};
use sketchpad_core::snap::{snap_angle, snap_to_grid};
use sketchpad_core::tools::{CursorHint, ToolKind};

/// Selection rectangle state for marquee selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    /// Starting point in device pixels.
    pub start: Point,
    /// Current point in device pixels.
    pub current: Point,
}

impl SelectionRect {
    /// Get the selection rectangle as a Rect.
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

/// Where resolved text goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextTarget {
    /// A new text icon at this normalized position.
    Place(Point),
    /// The text icon at this index.
    Edit(usize),
}

/// A pending request for the host to collect a line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub target: TextTarget,
    /// Value to prefill the host's input with.
    pub initial: String,
}

/// Gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// A stroke follows the pointer from `anchor` (snapped, device pixels).
    Drawing { stroke_index: usize, anchor: Point },
    SelectingMarquee(SelectionRect),
    DraggingSelection(DragState),
    /// Waiting for the host to resolve a text request; pointer presses are ignored.
    AwaitingTextInput(TextRequest),
}

/// What the editor must do after an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    pub repaint: bool,
    pub persist: bool,
    pub notice: Option<String>,
}

impl EventOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn repaint() -> Self {
        Self {
            repaint: true,
            ..Self::default()
        }
    }

    /// A committed mutation: repaint, then persist.
    pub fn commit() -> Self {
        Self {
            repaint: true,
            persist: true,
            notice: None,
        }
    }

    /// A rejected action with an advisory for the user.
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            repaint: true,
            persist: false,
            notice: Some(text.into()),
        }
    }

    fn when(changed: bool, outcome: Self) -> Self {
        if changed { outcome } else { Self::none() }
    }
}

/// Handles high-level events and translates them to canvas operations.
#[derive(Debug, Default)]
pub struct EventHandler {
    interaction: Interaction,
    /// Placement preview under the pointer.
    ghost: Option<Icon>,
    /// Last grid-snapped pointer position.
    pointer: Option<Point>,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn ghost(&self) -> Option<&Icon> {
        self.ghost.as_ref()
    }

    /// Last grid-snapped pointer position in device pixels.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Current marquee rectangle, if a marquee is being dragged.
    pub fn marquee(&self) -> Option<Rect> {
        match &self.interaction {
            Interaction::SelectingMarquee(rect) => Some(rect.to_rect()),
            _ => None,
        }
    }

    pub fn pending_text_request(&self) -> Option<&TextRequest> {
        match &self.interaction {
            Interaction::AwaitingTextInput(request) => Some(request),
            _ => None,
        }
    }

    /// Cursor the host should show.
    pub fn cursor(&self, canvas: &Canvas) -> CursorHint {
        match self.interaction {
            Interaction::DraggingSelection(_) => CursorHint::Grabbing,
            _ => canvas.tool_manager.cursor(),
        }
    }

    /// Check if a drag or marquee is in progress.
    pub fn is_manipulating(&self) -> bool {
        matches!(
            self.interaction,
            Interaction::DraggingSelection(_) | Interaction::SelectingMarquee(_)
        )
    }

    /// Cancel the marquee or drag. A drag puts the elements back where it started.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        match std::mem::take(&mut self.interaction) {
            Interaction::DraggingSelection(mut drag) => {
                let viewport = canvas.viewport;
                let start = drag.start_point;
                let (icons, strokes) = canvas.document.elements_mut();
                drag.apply(icons, strokes, &viewport, start);
            }
            Interaction::SelectingMarquee(_) => {}
            other => self.interaction = other,
        }
    }

    /// Drop every transient state without touching the document.
    pub fn reset(&mut self) {
        self.interaction = Interaction::Idle;
        self.ghost = None;
    }

    /// Forget a gesture or text edit whose indices a structural edit is about to invalidate.
    ///
    /// A pending placement keeps its normalized position and survives.
    pub fn end_gesture(&mut self) {
        match &self.interaction {
            Interaction::Drawing { .. } | Interaction::DraggingSelection(_) => {
                self.interaction = Interaction::Idle;
            }
            Interaction::AwaitingTextInput(TextRequest {
                target: TextTarget::Edit(index),
                ..
            }) => {
                log::debug!("Dropping text edit of icon {index}, the document changed");
                self.interaction = Interaction::Idle;
            }
            _ => {}
        }
    }

    /// Drop the placement preview.
    pub fn clear_ghost(&mut self) -> bool {
        self.ghost.take().is_some()
    }

    /// Handle a press event (pointer down).
    pub fn handle_press(
        &mut self,
        canvas: &mut Canvas,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> EventOutcome {
        if button != MouseButton::Left {
            return EventOutcome::none();
        }
        if matches!(self.interaction, Interaction::AwaitingTextInput(_)) {
            log::debug!("Ignoring press while text input is pending");
            return EventOutcome::none();
        }
        let snapped = snap_to_grid(position, canvas.viewport.grid_px());
        self.pointer = Some(snapped);
        let at = canvas.viewport.to_normalized(snapped);

        match canvas.tool() {
            ToolKind::Select => self.press_select(canvas, position, modifiers),
            ToolKind::Text => {
                self.ghost = None;
                self.interaction = Interaction::AwaitingTextInput(TextRequest {
                    target: TextTarget::Place(at),
                    initial: "Text".to_string(),
                });
                EventOutcome::repaint()
            }
            ToolKind::Earth => match canvas.next_earth(at) {
                Ok(icon) => self.place_icon(canvas, icon),
                Err(rejection) => {
                    log::info!("Earth electrode not placed: {rejection:?}");
                    self.ghost = None;
                    EventOutcome::notice(rejection.message())
                }
            },
            ToolKind::Air => self.place_icon(canvas, Icon::air(at)),
            ToolKind::Antenna => self.place_icon(canvas, Icon::antenna(at)),
            tool => match tool.stroke_style() {
                Some(style) => self.start_stroke(canvas, style, snapped, at),
                None => EventOutcome::none(),
            },
        }
    }

    fn press_select(&mut self, canvas: &mut Canvas, position: Point, modifiers: Modifiers) -> EventOutcome {
        let viewport = canvas.viewport;

        if let Some(index) = hit_test_icon(canvas.document.icons(), &viewport, position) {
            if modifiers.multi_select() {
                canvas.selection.toggle_icon(index);
                return EventOutcome::repaint();
            }
            if !canvas.selection.contains_icon(index) {
                canvas.selection.select_icon(index);
            }
            self.begin_drag(canvas, position);
            return EventOutcome::repaint();
        }

        if let Some(index) = hit_test_stroke(canvas.document.strokes(), &viewport, position) {
            if modifiers.multi_select() {
                canvas.selection.toggle_stroke(index);
                return EventOutcome::repaint();
            }
            canvas.selection.select_stroke(index);
            self.begin_drag(canvas, position);
            return EventOutcome::repaint();
        }

        canvas.selection.clear();
        self.interaction = Interaction::SelectingMarquee(SelectionRect {
            start: position,
            current: position,
        });
        EventOutcome::repaint()
    }

    fn begin_drag(&mut self, canvas: &Canvas, position: Point) {
        let drag = DragState::capture(
            canvas.document.icons(),
            canvas.document.strokes(),
            &canvas.selection,
            position,
        );
        self.interaction = match drag {
            Some(drag) => Interaction::DraggingSelection(drag),
            None => Interaction::Idle,
        };
    }

    fn place_icon(&mut self, canvas: &mut Canvas, icon: Icon) -> EventOutcome {
        log::debug!("Placing {} at ({:.3}, {:.3})", icon.kind.name(), icon.x, icon.y);
        canvas.add_icon(icon);
        self.ghost = None;
        EventOutcome::commit()
    }

    fn start_stroke(&mut self, canvas: &mut Canvas, style: StrokeStyle, anchor: Point, at: Point) -> EventOutcome {
        let tools = &canvas.tool_manager;
        let stroke = Stroke::anchored(style, tools.stroke_color, tools.stroke_width, at);
        let stroke_index = canvas.add_stroke(stroke);
        self.ghost = None;
        self.interaction = Interaction::Drawing { stroke_index, anchor };
        EventOutcome::repaint()
    }

    /// Handle pointer movement, with or without a button held.
    pub fn handle_move(&mut self, canvas: &mut Canvas, position: Point) -> EventOutcome {
        let viewport = canvas.viewport;
        let grid = viewport.grid_px();
        let snapped = snap_to_grid(position, grid);
        self.pointer = Some(snapped);

        let had_ghost = self.ghost.is_some();
        let tool = canvas.tool();
        if tool.shows_ghost() && !matches!(self.interaction, Interaction::AwaitingTextInput(_)) {
            self.ghost = preview(canvas, tool, viewport.to_normalized(snapped));
        } else if matches!(self.interaction, Interaction::Idle) {
            self.ghost = None;
        }
        let ghost_visible = had_ghost || self.ghost.is_some();

        match &mut self.interaction {
            Interaction::DraggingSelection(drag) => {
                let (icons, strokes) = canvas.document.elements_mut();
                drag.apply(icons, strokes, &viewport, position);
                EventOutcome::repaint()
            }
            Interaction::SelectingMarquee(rect) => {
                rect.current = position;
                EventOutcome::repaint()
            }
            Interaction::Drawing { stroke_index, anchor } => {
                let Some(stroke) = canvas.document.strokes_mut().get_mut(*stroke_index) else {
                    return EventOutcome::none();
                };
                let end = if stroke.style.is_rect() {
                    snap_to_grid(snapped, grid)
                } else {
                    snap_angle(*anchor, snapped, grid).point
                };
                stroke.set_end(viewport.to_normalized(end));
                EventOutcome::repaint()
            }
            _ => EventOutcome::when(ghost_visible, EventOutcome::repaint()),
        }
    }

    /// Handle a release event (pointer up).
    pub fn handle_release(&mut self, canvas: &mut Canvas) -> EventOutcome {
        match std::mem::take(&mut self.interaction) {
            Interaction::DraggingSelection(drag) => {
                log::debug!("Drag finished, moved by {:?}", drag.delta());
                EventOutcome::commit()
            }
            Interaction::SelectingMarquee(rect) => {
                let viewport = canvas.viewport;
                canvas.selection = marquee_select(
                    canvas.document.icons(),
                    canvas.document.strokes(),
                    &viewport,
                    rect.to_rect(),
                );
                EventOutcome::repaint()
            }
            Interaction::Drawing { .. } => EventOutcome::commit(),
            other => {
                self.interaction = other;
                EventOutcome::none()
            }
        }
    }

    /// The pointer left the canvas: finish the gesture and hide the preview.
    pub fn handle_leave(&mut self, canvas: &mut Canvas) -> EventOutcome {
        let mut outcome = self.handle_release(canvas);
        if self.clear_ghost() {
            outcome.repaint = true;
        }
        self.pointer = None;
        outcome
    }

    /// Handle a key press while the canvas has focus.
    pub fn handle_key(
        &mut self,
        canvas: &mut Canvas,
        key: &Key,
        modifiers: Modifiers,
        config: &EditorConfig,
    ) -> EventOutcome {
        let Some(action) = ShortcutRegistry::action_for(key, modifiers) else {
            return EventOutcome::none();
        };
        match action {
            EditorAction::Cancel => {
                self.cancel(canvas);
                self.ghost = None;
                canvas.set_tool(ToolKind::Select);
                EventOutcome::repaint()
            }
            EditorAction::DeleteSelection => self.delete_selected(canvas),
            EditorAction::Nudge { dx, dy, large } => {
                let step = config.nudge_for(large);
                EventOutcome::when(
                    canvas.nudge_selected(Vec2::new(dx * step, dy * step)),
                    EventOutcome::commit(),
                )
            }
            EditorAction::RotateSelection => EventOutcome::when(canvas.rotate_selected(), EventOutcome::commit()),
        }
    }

    /// Remove the selection.
    pub fn delete_selected(&mut self, canvas: &mut Canvas) -> EventOutcome {
        if canvas.selection.is_empty() {
            return EventOutcome::none();
        }
        self.end_gesture();
        EventOutcome::when(canvas.delete_selected(), EventOutcome::commit())
    }

    /// Ask the host for a replacement text for the single selected text icon.
    pub fn request_text_edit(&mut self, canvas: &Canvas) -> Option<&TextRequest> {
        if matches!(self.interaction, Interaction::AwaitingTextInput(_)) {
            return self.pending_text_request();
        }
        let index = canvas.selected_text_icon()?;
        let initial = canvas.document.icons()[index].text.clone().unwrap_or_default();
        self.interaction = Interaction::AwaitingTextInput(TextRequest {
            target: TextTarget::Edit(index),
            initial,
        });
        self.pending_text_request()
    }

    /// Resolve the pending text request. `None` means the user cancelled.
    ///
    /// New text icons need non-blank text; edits accept any trimmed value.
    pub fn resolve_text(&mut self, canvas: &mut Canvas, text: Option<String>) -> EventOutcome {
        let request = match std::mem::take(&mut self.interaction) {
            Interaction::AwaitingTextInput(request) => request,
            other => {
                self.interaction = other;
                log::warn!("Text input resolved with no pending request");
                return EventOutcome::none();
            }
        };
        let Some(text) = text.map(|t| t.trim().to_string()) else {
            log::debug!("Text input cancelled");
            return EventOutcome::none();
        };
        match request.target {
            TextTarget::Place(at) => {
                if text.is_empty() {
                    return EventOutcome::none();
                }
                canvas.add_icon(Icon::text(at, text));
                EventOutcome::commit()
            }
            TextTarget::Edit(index) => EventOutcome::when(canvas.set_text(index, text), EventOutcome::commit()),
        }
    }

    /// Advance the earth rotation preset and turn the preview with it.
    pub fn cycle_earth_rotation(&mut self, canvas: &mut Canvas) -> i32 {
        let rotation = canvas.tool_manager.cycle_earth_rotation();
        if let Some(ghost) = self.ghost.as_mut().filter(|g| g.rotation.is_some()) {
            ghost.rotation = Some(rotation);
        }
        rotation
    }
}

/// Ghost icon for a placement tool at a normalized position.
fn preview(canvas: &Canvas, tool: ToolKind, at: Point) -> Option<Icon> {
    match tool {
        ToolKind::Earth => canvas.next_earth(at).ok(),
        ToolKind::Air => Some(Icon::air(at)),
        ToolKind::Antenna => Some(Icon::antenna(at)),
        ToolKind::Text => Some(Icon::text(at, "Text")),
        _ => None,
    }
}
