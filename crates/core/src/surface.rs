//! Drawing target abstraction and the per-frame draw order.

use glam::DVec2;

use crate::color::{Rgba, Srgb};
use crate::flow_field::{DEFAULT_ARROW_SIZE, DEFAULT_ARROW_SPACING};
use crate::simulation::SimulationState;
use crate::trail::TrailBuffer;

/// Opacity of flow arrows, drawn in black.
pub const ARROW_ALPHA: f64 = 0.3;

/// Something frames can be drawn onto.
///
/// Coordinates are surface pixels with the origin at the top left.
pub trait RenderSurface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Resets every pixel to the background.
    fn clear(&mut self);
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);
    fn line(&mut self, from: DVec2, to: DVec2, color: Rgba);
    /// Composites the committed trail over the current contents.
    fn blit(&mut self, trail: &TrailBuffer);
}

/// Draws one frame: clear, trail (if enabled), dots (if shown), then flow
/// arrows (if shown).
pub fn render_frame<S: RenderSurface + ?Sized>(state: &SimulationState, surface: &mut S) {
    let config = state.config();
    surface.clear();

    if config.trail_enabled {
        surface.blit(state.trail());
    }

    if config.show_dots {
        let color = config.dot_color.with_alpha(1.0);
        for p in state.particles() {
            surface.fill_circle(p.position, p.radius(config.dot_radius), color);
        }
    }

    if config.show_arrows {
        let color = Srgb::BLACK.with_alpha(ARROW_ALPHA);
        let segments = state.field().arrow_segments(
            surface.width() as f64,
            surface.height() as f64,
            DEFAULT_ARROW_SPACING,
            DEFAULT_ARROW_SIZE,
        );
        for segment in segments {
            surface.line(segment.start, segment.end, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    /// Records draw calls instead of rasterizing them.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl RenderSurface for Recorder {
        fn width(&self) -> usize {
            40
        }
        fn height(&self) -> usize {
            20
        }
        fn clear(&mut self) {
            self.calls.push("clear");
        }
        fn fill_circle(&mut self, _center: DVec2, _radius: f64, _color: Rgba) {
            self.calls.push("circle");
        }
        fn line(&mut self, _from: DVec2, _to: DVec2, _color: Rgba) {
            self.calls.push("line");
        }
        fn blit(&mut self, _trail: &TrailBuffer) {
            self.calls.push("blit");
        }
    }

    fn state(config: SimConfig) -> SimulationState {
        SimulationState::new(40, 20, config, 3).unwrap()
    }

    #[test]
    fn draws_trail_then_dots_then_arrows() {
        let s = state(SimConfig {
            initial_particle_count: 2,
            trail_enabled: true,
            ..SimConfig::default()
        });
        let mut surface = Recorder::default();
        render_frame(&s, &mut surface);

        // 2 x 1 arrow lattice, 3 strokes each
        let expected: Vec<&str> = ["clear", "blit", "circle", "circle"]
            .into_iter()
            .chain(std::iter::repeat("line").take(6))
            .collect();
        assert_eq!(surface.calls, expected);
    }

    #[test]
    fn hidden_layers_are_skipped() {
        let s = state(SimConfig {
            initial_particle_count: 5,
            show_dots: false,
            show_arrows: false,
            ..SimConfig::default()
        });
        let mut surface = Recorder::default();
        render_frame(&s, &mut surface);
        assert_eq!(surface.calls, vec!["clear"]);
    }
}
