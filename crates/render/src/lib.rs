#![deny(unsafe_code)]
//! CPU-side drawing for flow-particles.
//!
//! [`PixelCanvas`] implements the core `RenderSurface` trait over an RGBA
//! float raster. With the `png` feature (default on) a canvas can be written
//! out as an 8-bit PNG via [`snapshot::write_png`].

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::PixelCanvas;
