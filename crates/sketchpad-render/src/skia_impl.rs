//! tiny-skia renderer implementation.

use crate::glyphs::{self, Baseline, TextAlign};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError, encode_rgba_png};
use ab_glyph::FontArc;
use kurbo::{Affine, BezPath, Circle, PathEl, Point, Rect, Shape, Size};
use peniko::Color;
use sketchpad_core::geometry::Viewport;
use sketchpad_core::selection::{EARTH_RADIUS, ICON_HITBOX};
use sketchpad_core::shapes::{Icon, IconKind, Stroke, StrokeStyle};
use tiny_skia as sk;

/// Opacity applied to the placement preview.
const GHOST_ALPHA: f32 = 0.55;

fn ink(alpha: u8) -> Color {
    Color::from_rgba8(0x0f, 0x17, 0x2a, alpha)
}

fn earth_green(alpha: u8) -> Color {
    Color::from_rgba8(0x16, 0xa3, 0x4a, alpha)
}

fn marquee_blue(alpha: u8) -> Color {
    Color::from_rgba8(59, 130, 246, alpha)
}

/// CPU renderer drawing into an owned RGBA pixmap.
pub struct SkiaRenderer {
    pixmap: sk::Pixmap,
    font: Option<FontArc>,
}

impl SkiaRenderer {
    /// Create a renderer with a transparent buffer of `size` device pixels.
    pub fn new(size: Size) -> RenderResult<Self> {
        Ok(Self {
            pixmap: allocate(size)?,
            font: None,
        })
    }

    /// Create a renderer sized for `viewport`.
    pub fn for_viewport(viewport: &Viewport) -> RenderResult<Self> {
        Self::new(viewport.device_size())
    }

    /// The underlying pixel buffer (premultiplied).
    pub fn pixmap(&self) -> &sk::Pixmap {
        &self.pixmap
    }

    /// Straight RGBA of one pixel, `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Buffer contents as straight RGBA bytes.
    fn rgba_data(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }
}

fn allocate(size: Size) -> RenderResult<sk::Pixmap> {
    let width = size.width.max(0.0).floor() as u32;
    let height = size.height.max(0.0).floor() as u32;
    sk::Pixmap::new(width, height)
        .ok_or_else(|| RendererError::Surface(format!("cannot allocate a {width}x{height} buffer")))
}

impl Renderer for SkiaRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let size = ctx.device_size();
        if size != self.size() {
            log::debug!("Render buffer {:?} does not match viewport {:?}, reallocating", self.size(), size);
            if let Err(e) = self.resize(size) {
                log::error!("Failed to resize render buffer: {e}");
                return;
            }
        }

        match ctx.background_color {
            Some(color) => self.pixmap.fill(to_skia_color(color)),
            None => self.pixmap.fill(sk::Color::TRANSPARENT),
        }

        let viewport = &ctx.canvas.viewport;
        let mut painter = Painter {
            pixmap: &mut self.pixmap,
            font: self.font.as_ref(),
            scale: ctx.scale_factor(),
        };

        if ctx.show_grid {
            painter.grid(size, viewport.grid_px(), ctx.grid_color);
        }

        let document = &ctx.canvas.document;
        let selection = &ctx.canvas.selection;
        for (index, stroke) in document.strokes().iter().enumerate() {
            painter.stroke_element(stroke, size, selection.contains_stroke(index), ctx.selection_color);
        }

        for (index, icon) in document.icons().iter().enumerate() {
            painter.icon(icon, viewport, false);
            if selection.contains_icon(index) {
                painter.selection_ring(viewport.to_device(icon.position()), ctx.selection_color);
            }
        }

        if let Some(ghost) = ctx.ghost {
            painter.icon(ghost, viewport, true);
        }

        if let Some(marquee) = ctx.marquee {
            painter.marquee(marquee);
        }
    }

    fn resize(&mut self, size: Size) -> RenderResult<()> {
        self.pixmap = allocate(size)?;
        Ok(())
    }

    fn size(&self) -> Size {
        Size::new(self.pixmap.width() as f64, self.pixmap.height() as f64)
    }

    fn set_font(&mut self, data: Vec<u8>) -> RenderResult<()> {
        let font = glyphs::load_font(data).map_err(|e| RendererError::Font(e.to_string()))?;
        self.font = Some(font);
        Ok(())
    }

    fn encode_png(&self) -> RenderResult<Vec<u8>> {
        encode_rgba_png(&self.rgba_data(), self.pixmap.width(), self.pixmap.height())
    }
}

/// Borrowed drawing state for one scene.
struct Painter<'a> {
    pixmap: &'a mut sk::Pixmap,
    font: Option<&'a FontArc>,
    /// Device pixel ratio; every symbol dimension is multiplied by it.
    scale: f64,
}

impl Painter<'_> {
    fn stroke(&mut self, path: &BezPath, color: Color, width: f64, dash: Option<[f64; 2]>) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let stroke = sk::Stroke {
            width: width as f32,
            line_cap: sk::LineCap::Round,
            line_join: sk::LineJoin::Round,
            dash: dash.and_then(|[on, off]| sk::StrokeDash::new(vec![on as f32, off as f32], 0.0)),
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, sk::Transform::identity(), None);
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint(color),
            sk::FillRule::Winding,
            sk::Transform::identity(),
            None,
        );
    }

    fn grid(&mut self, size: Size, grid_px: f64, color: Color) {
        if !(grid_px >= 1.0) {
            return;
        }
        let mut path = BezPath::new();
        let mut x = 0.0;
        while x <= size.width {
            path.move_to((x + 0.5, 0.0));
            path.line_to((x + 0.5, size.height));
            x += grid_px;
        }
        let mut y = 0.0;
        while y <= size.height {
            path.move_to((0.0, y + 0.5));
            path.line_to((size.width, y + 0.5));
            y += grid_px;
        }
        self.stroke(&path, color, 1.0, None);
    }

    fn stroke_element(&mut self, stroke: &Stroke, size: Size, selected: bool, selection_color: Color) {
        let path = stroke_outline(stroke, size);
        let r = self.scale;
        let width = stroke.width * r;
        let dash = (stroke.style == StrokeStyle::Dashed).then_some([6.0 * r, 6.0 * r]);
        self.stroke(&path, stroke.color.into(), width, dash);
        if selected {
            self.stroke(&path, selection_color, width.max(2.0 * r), Some([6.0 * r, 4.0 * r]));
        }
    }

    fn selection_ring(&mut self, center: Point, color: Color) {
        let r = self.scale;
        let ring = Circle::new(center, ICON_HITBOX * r).to_path(0.1);
        self.stroke(&ring, color, r, Some([4.0 * r, 4.0 * r]));
    }

    fn icon(&mut self, icon: &Icon, viewport: &Viewport, ghost: bool) {
        let center = viewport.to_device(icon.position());
        let r = self.scale;
        let alpha = if ghost { GHOST_ALPHA } else { 1.0 };
        let dash = ghost.then_some([4.0 * r, 4.0 * r]);
        let translate = Affine::translate(center.to_vec2());

        match icon.kind {
            IconKind::Earth => {
                let radius = EARTH_RADIUS * r;
                let rotation = icon.rotation_degrees();
                let mut symbol = Circle::new(Point::ZERO, radius).to_path(0.1);
                symbol.move_to((0.0, -radius * 0.85));
                symbol.line_to((0.0, -radius * 0.1));
                for (y, width) in [(0.05, 1.4), (0.35, 1.0), (0.62, 0.6)] {
                    symbol.move_to((-radius * width / 2.0, radius * y));
                    symbol.line_to((radius * width / 2.0, radius * y));
                }
                symbol.apply_affine(translate * Affine::rotate((rotation as f64).to_radians()));
                let color = earth_green(if ghost { 0x90 } else { 0xff }).multiply_alpha(alpha);
                self.stroke(&symbol, color, 2.0 * r, dash);

                // The label stays upright and moves above the symbol once it points upward.
                if let Some(label) = icon.trimmed_label() {
                    let fill = ink(if ghost { 179 } else { 255 }).multiply_alpha(alpha);
                    let offset = radius + 12.0 * r;
                    let (origin, baseline) = if rotation > 90 && rotation < 270 {
                        (Point::new(center.x, center.y - offset), Baseline::Bottom)
                    } else {
                        (Point::new(center.x, center.y + offset), Baseline::Top)
                    };
                    self.text(label, origin, 16.0 * r, TextAlign::Center, baseline, fill, None);
                }
            }
            IconKind::Air => {
                let s = 16.0 * r;
                let mut symbol = BezPath::new();
                symbol.move_to((0.0, -s));
                symbol.line_to((s, s));
                symbol.line_to((-s, s));
                symbol.close_path();
                symbol.apply_affine(translate);
                let color = ink(if ghost { 0x88 } else { 0xff }).multiply_alpha(alpha);
                self.stroke(&symbol, color, 1.5 * r, dash);

                if let Some(label) = icon.trimmed_label() {
                    let font_size = if ghost { 14.0 } else { 18.0 } * r;
                    let fill = ink(if ghost { 166 } else { 255 }).multiply_alpha(alpha);
                    let origin = Point::new(center.x, center.y + s + 6.0 * r);
                    self.text(label, origin, font_size, TextAlign::Center, Baseline::Top, fill, None);
                }
            }
            IconKind::Antenna => {
                let h = 22.0 * r;
                let w = 12.0 * r;
                let mut symbol = BezPath::new();
                symbol.move_to((0.0, -h));
                symbol.line_to((0.0, h));
                symbol.move_to((-w, -h + 5.0 * r));
                symbol.line_to((w, -h + 5.0 * r));
                symbol.apply_affine(translate);
                let color = ink(if ghost { 0x88 } else { 0xff }).multiply_alpha(alpha);
                self.stroke(&symbol, color, 1.5 * r, dash);
            }
            IconKind::Text => {
                if let Some(text) = icon.trimmed_text() {
                    let halo = (Color::from_rgba8(255, 255, 255, 217).multiply_alpha(alpha), 4.0 * r);
                    let fill = ink(if ghost { 153 } else { 255 }).multiply_alpha(alpha);
                    self.text(text, center, 12.0 * r, TextAlign::Left, Baseline::Middle, fill, Some(halo));
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        text: &str,
        origin: Point,
        size: f64,
        align: TextAlign,
        baseline: Baseline,
        fill: Color,
        halo: Option<(Color, f64)>,
    ) {
        let Some(font) = self.font else {
            log::debug!("No font loaded, skipping text {text:?}");
            return;
        };
        let path = glyphs::text_path(font, text, size as f32, origin, align, baseline);
        if let Some((color, width)) = halo {
            self.stroke(&path, color, width, None);
        }
        self.fill(&path, fill);
    }

    fn marquee(&mut self, rect: Rect) {
        let r = self.scale;
        let path = rect.abs().to_path(0.1);
        self.fill(&path, marquee_blue(31));
        self.stroke(&path, marquee_blue(230), r.max(1.0), Some([6.0 * r, 4.0 * r]));
    }
}

/// Device-space outline of a stroke: its rectangle for rect styles, else the polyline.
fn stroke_outline(stroke: &Stroke, size: Size) -> BezPath {
    if let Some(rect) = stroke.device_rect(size, 1.0) {
        return rect.to_path(0.1);
    }
    let mut path = BezPath::new();
    let points = stroke.device_points(size);
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
    }
    path
}

fn to_skia_path(path: &BezPath) -> Option<sk::Path> {
    let mut builder = sk::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn to_skia_color(color: Color) -> sk::Color {
    let rgba = color.to_rgba8();
    sk::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn paint(color: Color) -> sk::Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = sk::Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}
