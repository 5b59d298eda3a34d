//! Time-varying 2D force field sampled from gradient noise.
//!
//! Each sample draws two independent noise values: one at `(x, y, t)` giving
//! the angle of the x-component and one at the swapped position
//! `(y, x, t + 1000)` giving the angle of the y-component. The force is
//! `(cos(angle_x), sin(angle_y))`. The two angles are unrelated, so the
//! result is generally *not* a unit vector; downstream strength tuning
//! assumes exactly this distribution.

use std::f64::consts::{PI, TAU};

use glam::DVec2;

use crate::noise::NoiseSource;

/// Time offset separating the y-angle sample from the x-angle sample.
const DECORRELATION_OFFSET: f64 = 1000.0;

/// Default spacing of the arrow lattice, in surface units.
pub const DEFAULT_ARROW_SPACING: f64 = 20.0;
/// Default arrow shaft length for a force component of 1.
pub const DEFAULT_ARROW_SIZE: f64 = 10.0;

/// Tunable flow parameters. `time_offset` advances every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParams {
    /// Spatial frequency. Smaller values give larger flow features.
    pub scale: f64,
    /// Current field time.
    pub time_offset: f64,
    /// Field time advanced per second of simulation.
    pub speed: f64,
    /// Multiplier applied by the integrator to each sampled force.
    pub strength: f64,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            scale: 0.005,
            time_offset: 0.0,
            speed: 0.1,
            strength: 100.0,
        }
    }
}

/// A straight line segment, used for flow arrows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

/// Noise-driven force field.
///
/// A field built with [`FlowField::unseeded`] has no noise source and
/// returns the zero vector everywhere, so integration never stalls on a
/// missing dependency.
pub struct FlowField {
    source: Option<Box<dyn NoiseSource>>,
    params: FlowParams,
}

impl FlowField {
    /// Creates a field over `source`.
    pub fn new(source: Box<dyn NoiseSource>, params: FlowParams) -> Self {
        Self {
            source: Some(source),
            params,
        }
    }

    /// Creates a field with no noise source; every sample is `(0, 0)`.
    pub fn unseeded(params: FlowParams) -> Self {
        Self {
            source: None,
            params,
        }
    }

    /// Whether a noise source is attached.
    pub fn is_seeded(&self) -> bool {
        self.source.is_some()
    }

    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut FlowParams {
        &mut self.params
    }

    /// Advances field time by `dt * speed`.
    pub fn advance(&mut self, dt: f64) {
        self.params.time_offset += dt * self.params.speed;
    }

    /// Samples the raw force at `(x, y)`.
    ///
    /// Returns `None` when there is no noise source or the sample is not
    /// finite. Each component of a `Some` result lies in [-1, 1].
    pub fn try_sample(&self, x: f64, y: f64) -> Option<DVec2> {
        let source = self.source.as_deref()?;
        let FlowParams {
            scale, time_offset, ..
        } = self.params;

        let angle_x = source.noise(x * scale, y * scale, time_offset) * TAU;
        let angle_y =
            source.noise(y * scale, x * scale, time_offset + DECORRELATION_OFFSET) * TAU;
        let force = DVec2::new(angle_x.cos(), angle_y.sin());
        force.is_finite().then_some(force)
    }

    /// Samples the force at `(x, y)`, falling back to the zero vector.
    pub fn sample_force(&self, x: f64, y: f64) -> DVec2 {
        self.try_sample(x, y).unwrap_or(DVec2::ZERO)
    }

    /// Arrow glyphs over a `width` x `height` area.
    ///
    /// For every lattice point stepping by `spacing` from the origin, emits a
    /// shaft from the point along `force * size` and two head strokes of
    /// length `size / 3` at ±30° back from the tip. Returns nothing when
    /// `spacing` is not positive.
    pub fn arrow_segments(&self, width: f64, height: f64, spacing: f64, size: f64) -> Vec<Segment> {
        if spacing.is_nan() || spacing <= 0.0 {
            return Vec::new();
        }
        let cols = (width / spacing).ceil().max(0.0) as usize;
        let rows = (height / spacing).ceil().max(0.0) as usize;
        let mut segments = Vec::with_capacity(cols * rows * 3);

        for col in 0..cols {
            for row in 0..rows {
                let origin = DVec2::new(col as f64 * spacing, row as f64 * spacing);
                let force = self.sample_force(origin.x, origin.y);
                let tip = origin + force * size;
                let angle = force.y.atan2(force.x);
                let head = size / 3.0;

                segments.push(Segment { start: origin, end: tip });
                for barb in [angle - PI / 6.0, angle + PI / 6.0] {
                    segments.push(Segment {
                        start: tip,
                        end: tip - DVec2::from_angle(barb) * head,
                    });
                }
            }
        }
        segments
    }
}
