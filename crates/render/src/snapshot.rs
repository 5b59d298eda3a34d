//! PNG output of a [`PixelCanvas`].
//!
//! Feature-gated behind `png` (default on) so the canvas can be used without
//! pulling in the `image` crate.

use flow_particles_core::error::SimError;
use flow_particles_core::surface::RenderSurface;
use std::path::Path;

use crate::pixel::PixelCanvas;

/// Writes `canvas` as an 8-bit RGBA PNG.
///
/// Returns `SimError::InvalidDimensions` if the canvas does not fit `u32`
/// dimensions, or `SimError::Io` on encode or write failure.
pub fn write_png(canvas: &PixelCanvas, path: &Path) -> Result<(), SimError> {
    let w = u32::try_from(canvas.width()).map_err(|_| SimError::InvalidDimensions)?;
    let h = u32::try_from(canvas.height()).map_err(|_| SimError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, canvas.to_rgba8())
        .ok_or_else(|| SimError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| SimError::Io(e.to_string()))?;
    log::info!("wrote {w}x{h} snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_particles_core::color::Srgb;
    use glam::DVec2;

    #[test]
    fn write_png_round_trip() {
        let mut canvas = PixelCanvas::new(16, 12).unwrap();
        canvas.fill_circle(DVec2::new(8.0, 6.0), 3.0, Srgb::BLACK.with_alpha(1.0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&canvas, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (16, 12));
        assert_eq!(img.get_pixel(8, 6).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn write_to_missing_directory_is_io_error() {
        let canvas = PixelCanvas::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/frame.png");
        assert!(matches!(write_png(&canvas, &path), Err(SimError::Io(_))));
    }
}
