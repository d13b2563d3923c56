//! Renderer trait abstraction.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Rect, Size};
use peniko::Color;
use sketchpad_core::canvas::Canvas;
use sketchpad_core::shapes::Icon;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Prefix of a PNG data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Context for a single render pass.
pub struct RenderContext<'a> {
    /// The canvas to render: document, selection and viewport.
    pub canvas: &'a Canvas,
    /// Background color; `None` leaves the buffer transparent so the host
    /// background shows through.
    pub background_color: Option<Color>,
    /// Paint grid lines into the buffer.
    pub show_grid: bool,
    /// Grid line color.
    pub grid_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Placement preview under the pointer.
    pub ghost: Option<&'a Icon>,
    /// Marquee rectangle in device pixels.
    pub marquee: Option<Rect>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            background_color: None,
            show_grid: false,
            grid_color: Color::from_rgba8(0xe5, 0xe7, 0xeb, 255),
            selection_color: Color::from_rgba8(0x25, 0x63, 0xeb, 255),
            ghost: None,
            marquee: None,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }

    /// Toggle grid lines.
    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Set the selection highlight color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Set the ghost icon.
    pub fn with_ghost(mut self, ghost: Option<&'a Icon>) -> Self {
        self.ghost = ghost;
        self
    }

    /// Set the marquee rectangle.
    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    /// Device pixel size of the target buffer.
    pub fn device_size(&self) -> Size {
        self.canvas.viewport.device_size()
    }

    /// Device pixel ratio.
    pub fn scale_factor(&self) -> f64 {
        self.canvas.viewport.scale_factor
    }
}

/// Trait for rendering backends.
///
/// A backend owns its pixel buffer. `build_scene` clears it and redraws the
/// whole context, so the buffer is always a function of the model plus the
/// transient state in the context.
pub trait Renderer: Send + Sync {
    /// Clear the buffer and draw the full scene.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Reallocate the buffer for a new device pixel size. Content is discarded.
    fn resize(&mut self, size: Size) -> RenderResult<()>;

    /// Current buffer size in device pixels.
    fn size(&self) -> Size;

    /// Supply font data (TrueType/OpenType) for labels and text icons.
    fn set_font(&mut self, data: Vec<u8>) -> RenderResult<()>;

    /// Encode the current buffer as PNG.
    fn encode_png(&self) -> RenderResult<Vec<u8>>;

    /// Encode the current buffer as a `data:image/png;base64,` URL.
    fn snapshot_data_url(&self) -> RenderResult<String> {
        Ok(png_data_url(&self.encode_png()?))
    }
}

/// Encode straight (non-premultiplied) RGBA8 pixels as PNG.
pub fn encode_rgba_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    if rgba_data.len() != expected {
        return Err(RendererError::Encode(format!(
            "expected {expected} bytes for {width}x{height}, got {}",
            rgba_data.len()
        )));
    }
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RendererError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Wrap PNG bytes in a data URL.
pub fn png_data_url(png_data: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rgba_png_signature() {
        let pixels = vec![255u8; 2 * 3 * 4];
        let png_data = encode_rgba_png(&pixels, 2, 3).unwrap();
        assert_eq!(&png_data[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_encode_rgba_png_rejects_wrong_length() {
        assert!(matches!(encode_rgba_png(&[0; 5], 2, 2), Err(RendererError::Encode(_))));
    }

    #[test]
    fn test_png_data_url() {
        let url = png_data_url(&[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_context_builder() {
        let canvas = Canvas::new();
        let ctx = RenderContext::new(&canvas)
            .with_grid(true)
            .with_marquee(Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(ctx.show_grid);
        assert!(ctx.marquee.is_some());
        assert!(ctx.ghost.is_none());
        assert_eq!(ctx.device_size(), canvas.viewport.device_size());
    }
}
