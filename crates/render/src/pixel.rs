//! Float RGBA raster implementing [`RenderSurface`].
//!
//! Always available (no feature gate); the PNG writer only converts what
//! this canvas holds.

use flow_particles_core::color::Rgba;
use flow_particles_core::error::SimError;
use flow_particles_core::surface::RenderSurface;
use flow_particles_core::trail::{disc_bounds, TrailBuffer};
use glam::DVec2;

/// Lines longer than this many pixel steps are skipped as degenerate.
const MAX_LINE_STEPS: f64 = 1e6;

/// Row-major straight-alpha raster with a fixed background color.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    background: Rgba,
    pixels: Vec<Rgba>,
}

impl PixelCanvas {
    /// Creates a canvas filled with opaque white.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        Self::with_background(width, height, Rgba::WHITE)
    }

    pub fn with_background(width: usize, height: usize, background: Rgba) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        let len = width.checked_mul(height).ok_or(SimError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            background,
            pixels: vec![background; len],
        })
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// 8-bit RGBA bytes, four per pixel, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgba8()).collect()
    }

    fn blend_at(&mut self, x: usize, y: usize, color: Rgba) {
        let px = &mut self.pixels[y * self.width + x];
        *px = color.over(*px);
    }
}

impl RenderSurface for PixelCanvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        let Some((x0, x1, y0, y1)) = disc_bounds(center, radius, self.width, self.height) else {
            return;
        };
        let r2 = radius * radius;
        for y in y0..y1 {
            let dy = y as f64 + 0.5 - center.y;
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.blend_at(x, y, color);
                }
            }
        }
    }

    /// One-pixel line by uniform sampling; each pixel is blended at most once.
    fn line(&mut self, from: DVec2, to: DVec2, color: Rgba) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let delta = to - from;
        let steps = delta.abs().max_element().ceil().max(1.0);
        if steps > MAX_LINE_STEPS {
            return;
        }
        let (w, h) = (self.width as f64, self.height as f64);
        let mut last = None;
        for i in 0..=steps as usize {
            let p = from + delta * (i as f64 / steps);
            let (x, y) = (p.x.floor(), p.y.floor());
            if x < 0.0 || y < 0.0 || x >= w || y >= h {
                continue;
            }
            let cell = (x as usize, y as usize);
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            self.blend_at(cell.0, cell.1, color);
        }
    }

    fn blit(&mut self, trail: &TrailBuffer) {
        if trail.width() != self.width || trail.height() != self.height {
            log::warn!(
                "skipping trail blit: trail is {}x{}, canvas is {}x{}",
                trail.width(),
                trail.height(),
                self.width,
                self.height
            );
            return;
        }
        for (dst, src) in self.pixels.iter_mut().zip(trail.pixels()) {
            if src.a > 0.0 {
                *dst = src.over(*dst);
            }
        }
    }
}
