//! Sketchpad Render Library
//!
//! Renderer abstraction and implementations for Sketchpad.
//! The default implementation rasterizes on the CPU with tiny-skia, so the
//! buffer it draws is also the PNG snapshot handed to the host.

mod renderer;

#[cfg(feature = "skia-renderer")]
pub mod glyphs;
#[cfg(feature = "skia-renderer")]
mod skia_impl;

pub use renderer::{
    PNG_DATA_URL_PREFIX, RenderContext, RenderResult, Renderer, RendererError, encode_rgba_png, png_data_url,
};

#[cfg(feature = "skia-renderer")]
pub use skia_impl::SkiaRenderer;
