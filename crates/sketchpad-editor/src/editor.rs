//! The mounted editor: canvas, event handling, rendering and host persistence.
//!
//! Every entry point runs synchronously: mutate, repaint the whole buffer,
//! then push a snapshot to the host when the mutation is committed.

use crate::error::EditorResult;
use crate::event_handler::{EventHandler, EventOutcome, TextRequest};
use crate::notices::{Notice, NoticeBoard};
use crate::shortcuts::ShortcutRegistry;
use kurbo::{Point, Size};
use sketchpad_core::canvas::Canvas;
use sketchpad_core::config::EditorConfig;
use sketchpad_core::geometry::Viewport;
use sketchpad_core::input::{Key, Modifiers, MouseButton, PointerEvent};
use sketchpad_core::selection::Selection;
use sketchpad_core::shapes::{SerializableColor, SketchModel};
use sketchpad_core::storage::{HostDocument, PersistedSketch};
use sketchpad_core::tools::{CursorHint, ToolKind};
use sketchpad_render::{RenderContext, Renderer, SkiaRenderer};

/// Editor mounted into a host document.
pub struct SketchEditor<H: HostDocument, R: Renderer = SkiaRenderer> {
    canvas: Canvas,
    events: EventHandler,
    renderer: R,
    host: H,
    config: EditorConfig,
    notices: NoticeBoard,
    grid_visible: bool,
    focused: bool,
}

fn viewport_for(config: &EditorConfig, css_size: Size, scale_factor: f64) -> Viewport {
    Viewport::with_limits(css_size, scale_factor, config.min_css_size(), config.grid_size)
}

impl<H: HostDocument> SketchEditor<H, SkiaRenderer> {
    /// Mount with the built-in raster backend.
    pub fn mount(host: H, config: EditorConfig, css_size: Size, scale_factor: f64) -> EditorResult<Self> {
        let viewport = viewport_for(&config, css_size, scale_factor);
        let renderer = SkiaRenderer::for_viewport(&viewport)?;
        Self::mount_with_renderer(host, renderer, config, css_size, scale_factor)
    }
}

impl<H: HostDocument, R: Renderer> SketchEditor<H, R> {
    /// Mount with a caller-supplied renderer.
    ///
    /// Loads the host's snapshot (a corrupt one is logged and replaced by an
    /// empty sketch), pulls the earth labels and paints the first frame.
    pub fn mount_with_renderer(
        host: H,
        mut renderer: R,
        config: EditorConfig,
        css_size: Size,
        scale_factor: f64,
    ) -> EditorResult<Self> {
        let viewport = viewport_for(&config, css_size, scale_factor);
        renderer.resize(viewport.device_size())?;

        let mut canvas = Canvas::new();
        canvas.viewport = viewport;
        canvas.tool_manager.stroke_color = config.stroke_color;
        canvas.tool_manager.set_stroke_width(config.stroke_width);

        match host.initial_model() {
            Ok(Some(model)) => canvas.load(model),
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring unreadable sketch from host: {e}"),
        }
        let labels = host.earth_labels().unwrap_or_else(|e| {
            log::warn!("Failed to read earth labels from host: {e}");
            Vec::new()
        });
        let relabeled = canvas.set_earth_labels(labels);

        log::info!(
            "Sketch editor mounted: {} strokes, {} icons, {:?} device px",
            canvas.document.strokes().len(),
            canvas.document.icons().len(),
            viewport.device_size()
        );

        let mut editor = Self {
            canvas,
            events: EventHandler::new(),
            renderer,
            host,
            notices: NoticeBoard::new(config.notice_duration_ms),
            config,
            grid_visible: true,
            focused: false,
        };
        let outcome = if relabeled { EventOutcome::commit() } else { EventOutcome::repaint() };
        editor.apply(outcome);
        Ok(editor)
    }

    /// Detach from the host, returning it together with the final snapshot.
    pub fn unmount(self) -> (H, PersistedSketch) {
        let snapshot = self.snapshot();
        log::info!("Sketch editor unmounted");
        (self.host, snapshot)
    }

    // --- Pointer and keyboard ---

    /// Dispatch a pointer event. Positions are CSS pixels relative to the canvas.
    pub fn pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    /// Pointer pressed. Also gives the canvas keyboard focus.
    pub fn pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        self.focused = true;
        let device = self.canvas.viewport.css_to_device(position);
        let outcome = self.events.handle_press(&mut self.canvas, device, button, modifiers);
        self.apply(outcome);
    }

    pub fn pointer_move(&mut self, position: Point) {
        let device = self.canvas.viewport.css_to_device(position);
        let outcome = self.events.handle_move(&mut self.canvas, device);
        self.apply(outcome);
    }

    /// Pointer released; the release position counts as a final move.
    pub fn pointer_up(&mut self, position: Point) {
        let device = self.canvas.viewport.css_to_device(position);
        let moved = self.events.handle_move(&mut self.canvas, device);
        let mut outcome = self.events.handle_release(&mut self.canvas);
        outcome.repaint |= moved.repaint;
        self.apply(outcome);
    }

    /// Pointer left the canvas: finishes the gesture like a release and hides the preview.
    pub fn pointer_leave(&mut self) {
        let outcome = self.events.handle_leave(&mut self.canvas);
        self.apply(outcome);
    }

    /// Handle a key press. Returns whether the editor consumed it; keys are
    /// ignored while the canvas is not focused.
    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        if !self.focused {
            return false;
        }
        let outcome = self
            .events
            .handle_key(&mut self.canvas, key, modifiers, &self.config);
        let handled = outcome.repaint || outcome.persist;
        self.apply(outcome);
        handled
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // --- Toolbar ---

    /// Switch tools. The selection and any placement preview are dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("Tool changed to {}", tool.name());
        self.canvas.set_tool(tool);
        self.events.reset();
        self.apply(EventOutcome::repaint());
    }

    pub fn tool(&self) -> ToolKind {
        self.canvas.tool()
    }

    /// Color for new strokes; existing strokes keep theirs.
    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        self.canvas.tool_manager.stroke_color = color;
    }

    /// Width for new strokes, clamped to 1..=8.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.canvas.tool_manager.set_stroke_width(width);
    }

    /// Toggle the grid. The host draws the on-screen grid; the raster buffer
    /// carries it only when `grid_in_snapshot` is configured.
    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
        if self.config.grid_in_snapshot {
            self.apply(EventOutcome::repaint());
        }
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// Advance the rotation given to new earth electrodes by 90°.
    pub fn cycle_earth_rotation_preset(&mut self) -> i32 {
        let rotation = self.events.cycle_earth_rotation(&mut self.canvas);
        if self.events.ghost().is_some() {
            self.apply(EventOutcome::repaint());
        }
        rotation
    }

    pub fn earth_rotation_preset(&self) -> i32 {
        self.canvas.tool_manager.earth_rotation_preset
    }

    /// Remove the newest icon, or the newest stroke when there are no icons.
    pub fn undo(&mut self) -> bool {
        self.events.end_gesture();
        let undone = self.canvas.undo();
        if undone {
            self.apply(EventOutcome::commit());
        }
        undone
    }

    /// Remove everything and drop all transient state.
    pub fn clear_all(&mut self) {
        self.canvas.clear();
        self.events.reset();
        self.apply(EventOutcome::commit());
    }

    pub fn delete_selected(&mut self) -> bool {
        let outcome = self.events.delete_selected(&mut self.canvas);
        let deleted = outcome.persist;
        self.apply(outcome);
        deleted
    }

    /// Rotate selected earth electrodes by 90°.
    pub fn rotate_selected(&mut self) -> bool {
        let rotated = self.canvas.rotate_selected();
        if rotated {
            self.apply(EventOutcome::commit());
        }
        rotated
    }

    // --- Text input ---

    /// Ask for a new text for the single selected text icon. Returns the
    /// request to show, or `None` when the selection is not one text icon.
    pub fn edit_selected_text(&mut self) -> Option<TextRequest> {
        self.events.request_text_edit(&self.canvas).cloned()
    }

    pub fn pending_text_request(&self) -> Option<&TextRequest> {
        self.events.pending_text_request()
    }

    /// Resolve the pending text request; `None` cancels it. Returns whether
    /// the sketch changed.
    pub fn resolve_text_input(&mut self, text: Option<String>) -> bool {
        let outcome = self.events.resolve_text(&mut self.canvas, text);
        let changed = outcome.persist;
        self.apply(outcome);
        changed
    }

    // --- Host data ---

    /// Replace the earth label list. Existing electrodes are relabeled in
    /// placement order; returns whether any label changed.
    pub fn set_earth_labels(&mut self, labels: Vec<String>) -> bool {
        let changed = self.canvas.set_earth_labels(labels);
        if changed {
            log::debug!("Earth labels changed, relabeled existing electrodes");
            self.apply(EventOutcome::commit());
        }
        changed
    }

    /// Pull the earth labels from the host again.
    pub fn sync_earth_labels(&mut self) -> EditorResult<bool> {
        let labels = self.host.earth_labels()?;
        Ok(self.set_earth_labels(labels))
    }

    /// Follow a change of the drawable area. Normalized data is untouched.
    pub fn resize(&mut self, css_size: Size, scale_factor: f64) -> EditorResult<()> {
        let viewport = viewport_for(&self.config, css_size, scale_factor);
        if viewport == self.canvas.viewport {
            return Ok(());
        }
        self.renderer.resize(viewport.device_size())?;
        self.canvas.viewport = viewport;
        log::debug!("Viewport resized to {:?} device px", viewport.device_size());
        self.apply(EventOutcome::repaint());
        Ok(())
    }

    /// Supply the font used for labels and text icons.
    pub fn set_font(&mut self, data: Vec<u8>) -> EditorResult<()> {
        self.renderer.set_font(data)?;
        self.apply(EventOutcome::repaint());
        Ok(())
    }

    // --- Queries ---

    pub fn cursor(&self) -> CursorHint {
        self.events.cursor(&self.canvas)
    }

    /// Last grid-snapped pointer position in device pixels.
    pub fn pointer_position(&self) -> Option<Point> {
        self.events.pointer()
    }

    /// Last pointer position in metres, for the host's coordinate readout.
    pub fn pointer_readout(&self) -> Option<(f64, f64)> {
        self.events
            .pointer()
            .map(|p| self.canvas.viewport.pointer_readout(p))
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    pub fn notice_duration_ms(&self) -> u64 {
        self.notices.duration_ms()
    }

    /// Keyboard help for the host: formatted key combination and description.
    pub fn shortcut_help(&self) -> Vec<(String, &'static str)> {
        ShortcutRegistry::all()
            .into_iter()
            .map(|shortcut| (shortcut.format(), shortcut.description))
            .collect()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn selection(&self) -> &Selection {
        &self.canvas.selection
    }

    pub fn model(&self) -> SketchModel {
        self.canvas.model()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Current model plus the raster buffer as a PNG data URL.
    pub fn snapshot(&self) -> PersistedSketch {
        let raster = self.renderer.snapshot_data_url().unwrap_or_else(|e| {
            log::error!("Failed to encode sketch snapshot: {e}");
            String::new()
        });
        PersistedSketch::new(self.canvas.model(), raster)
    }

    // --- Internals ---

    fn apply(&mut self, outcome: EventOutcome) {
        if outcome.repaint || outcome.persist {
            self.repaint();
        }
        if outcome.persist {
            self.persist();
        }
        if let Some(text) = outcome.notice {
            self.notices.post(text);
        }
    }

    fn repaint(&mut self) {
        let ctx = RenderContext::new(&self.canvas)
            .with_grid(self.grid_visible && self.config.grid_in_snapshot)
            .with_selection_color(self.config.selection_color.into())
            .with_ghost(self.events.ghost())
            .with_marquee(self.events.marquee());
        self.renderer.build_scene(&ctx);
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.host.persist(&snapshot) {
            log::error!("Failed to persist sketch: {e}");
        }
    }
}
