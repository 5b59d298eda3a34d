//! Persistent motion-trail raster.
//!
//! The buffer holds two equally sized pixel planes and an index naming the
//! committed one, the same ping-pong arrangement used for double-buffered
//! render targets. [`TrailBuffer::acquire`] copies the committed plane into
//! the spare one and hands out a [`TrailFrame`] guard over it; only
//! [`TrailFrame::commit`] flips the index. A guard dropped without commit
//! leaves the committed plane untouched.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::SimError;

/// How trail opacity falls off each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailDecay {
    /// `alpha *= fade`
    #[default]
    Exponential,
    /// `alpha -= 1 - fade`
    Linear,
}

impl TrailDecay {
    /// Alpha after one frame of decay, never below zero.
    pub fn apply(self, alpha: f32, fade: f32) -> f32 {
        let next = match self {
            TrailDecay::Exponential => alpha * fade,
            TrailDecay::Linear => alpha - (1.0 - fade),
        };
        next.max(0.0)
    }
}

/// Straight-alpha RGBA trail raster sized to the render surface.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    width: usize,
    height: usize,
    planes: [Vec<Rgba>; 2],
    front: usize,
}

impl TrailBuffer {
    /// Creates a fully transparent buffer.
    ///
    /// Returns `SimError::InvalidDimensions` if either side is zero or the
    /// pixel count overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            planes: [
                vec![Rgba::TRANSPARENT; len],
                vec![Rgba::TRANSPARENT; len],
            ],
            front: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Committed pixels, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.planes[self.front]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels()[y * self.width + x])
    }

    /// Whether every committed pixel is fully transparent.
    pub fn is_clear(&self) -> bool {
        self.pixels().iter().all(|p| p.a == 0.0)
    }

    /// Makes every committed pixel transparent.
    pub fn clear(&mut self) {
        self.planes[self.front].fill(Rgba::TRANSPARENT);
    }

    /// Reallocates both planes for new dimensions and clears them.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SimError> {
        let len = pixel_count(width, height)?;
        for plane in &mut self.planes {
            plane.clear();
            plane.resize(len, Rgba::TRANSPARENT);
        }
        self.width = width;
        self.height = height;
        self.front = 0;
        Ok(())
    }

    /// Starts a scoped update on a working copy of the committed pixels.
    pub fn acquire(&mut self) -> TrailFrame<'_> {
        let back = 1 - self.front;
        let [a, b] = &mut self.planes;
        let (src, dst) = if back == 1 { (&*a, b) } else { (&*b, a) };
        dst.copy_from_slice(src);
        TrailFrame { buffer: self }
    }
}

/// Scoped write access to a [`TrailBuffer`].
///
/// All drawing goes to the spare plane; [`TrailFrame::commit`] publishes it.
pub struct TrailFrame<'a> {
    buffer: &'a mut TrailBuffer,
}

impl TrailFrame<'_> {
    fn working(&mut self) -> &mut [Rgba] {
        let back = 1 - self.buffer.front;
        &mut self.buffer.planes[back]
    }

    /// Working-copy pixels, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.buffer.planes[1 - self.buffer.front]
    }

    /// Decays every pixel's alpha by one frame.
    pub fn decay(&mut self, policy: TrailDecay, fade: f32) {
        for px in self.working() {
            px.a = policy.apply(px.a, fade);
        }
    }

    /// Composites a filled disc of `color` over the working copy.
    ///
    /// A pixel is covered when its centre lies within `radius` of `center`.
    /// Discs that are empty or entirely off the raster are ignored.
    pub fn stamp_disc(&mut self, center: DVec2, radius: f64, color: Rgba) {
        let width = self.buffer.width;
        let height = self.buffer.height;
        let Some((x0, x1, y0, y1)) = disc_bounds(center, radius, width, height) else {
            return;
        };
        let r2 = radius * radius;
        let pixels = self.working();
        for y in y0..y1 {
            let dy = y as f64 + 0.5 - center.y;
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    let px = &mut pixels[y * width + x];
                    *px = color.over(*px);
                }
            }
        }
    }

    /// Publishes the working copy as the committed trail.
    pub fn commit(self) {
        self.buffer.front = 1 - self.buffer.front;
    }
}

/// Clipped pixel bounds `[x0, x1) x [y0, y1)` of a disc, or `None` if it
/// covers nothing on a `width` x `height` raster.
pub fn disc_bounds(
    center: DVec2,
    radius: f64,
    width: usize,
    height: usize,
) -> Option<(usize, usize, usize, usize)> {
    if !(center.is_finite() && radius.is_finite() && radius > 0.0) {
        return None;
    }
    let clip = |lo: f64, hi: f64, max: usize| {
        let lo = lo.floor().max(0.0);
        let hi = hi.ceil().min(max as f64);
        (lo < hi).then_some((lo as usize, hi as usize))
    };
    let (x0, x1) = clip(center.x - radius, center.x + radius, width)?;
    let (y0, y1) = clip(center.y - radius, center.y + radius, height)?;
    Some((x0, x1, y0, y1))
}

fn pixel_count(width: usize, height: usize) -> Result<usize, SimError> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(SimError::InvalidDimensions)
}
