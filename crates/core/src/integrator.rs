//! Per-frame motion: force integration, boundary handling and spawning.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::flow_field::FlowField;
use crate::particle::{Particle, ParticleStore};
use crate::prng::Xorshift64;

/// Default distance beyond the surface edge at which particles are culled.
pub const DEFAULT_CULL_MARGIN: f64 = 100.0;

/// Horizontal speed of freshly spawned particles (leftwards).
const SPAWN_SPEED_X: f64 = -100.0;
/// Spawned vertical speed is uniform in `[-SPAWN_SPREAD_Y, SPAWN_SPREAD_Y)`.
const SPAWN_SPREAD_Y: f64 = 25.0;
/// Upper bound on catch-up spawns in one step. A stalled host would
/// otherwise flood the store after a long pause.
pub const MAX_SPAWNS_PER_STEP: usize = 10_000;

/// What happens to particles that leave the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum BoundaryPolicy {
    /// Remove particles further than `margin` outside any edge.
    Cull { margin: f64 },
    /// Wrap positions toroidally into `[0, width) x [0, height)`.
    Wrap,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self::Cull {
            margin: DEFAULT_CULL_MARGIN,
        }
    }
}

/// Applies flow force, directional force, motion and friction to every
/// particle, in that order.
///
/// The flow field is sampled at the position held *before* this step's
/// move. Returns the number of samples that fell back to zero because a
/// seeded field produced a non-finite force.
pub fn integrate(particles: &mut [Particle], field: &FlowField, directional: DVec2, dt: f64) -> usize {
    let strength = field.params().strength;
    let mut faults = 0;

    for p in particles.iter_mut() {
        let force = match field.try_sample(p.position.x, p.position.y) {
            Some(force) => force,
            None => {
                if field.is_seeded() {
                    faults += 1;
                }
                DVec2::ZERO
            }
        };
        p.velocity += force * strength * dt;
        p.velocity += directional * dt;
        p.position += p.velocity * dt;
        p.velocity *= 1.0 - p.friction * dt;
    }
    faults
}

/// Applies `policy` for a `width` x `height` surface. Returns the number of
/// particles removed.
pub fn apply_boundary(
    store: &mut ParticleStore,
    policy: BoundaryPolicy,
    width: f64,
    height: f64,
) -> usize {
    match policy {
        BoundaryPolicy::Cull { margin } => store.retain(|p| {
            let DVec2 { x, y } = p.position;
            x >= -margin && x <= width + margin && y >= -margin && y <= height + margin
        }),
        BoundaryPolicy::Wrap => {
            for p in store.as_mut_slice() {
                p.position.x = wrap_coord(p.position.x, width);
                p.position.y = wrap_coord(p.position.y, height);
            }
            0
        }
    }
}

/// Folds `value` into `[0, extent)`. `rem_euclid` rounds tiny negative
/// inputs up to `extent` itself, which maps to 0.
fn wrap_coord(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Emits particles at the right edge at a fixed rate.
///
/// Time accumulates across steps; each step spawns one particle per full
/// `interval` accumulated, keeping the remainder.
#[derive(Debug, Clone)]
pub struct Spawner {
    accumulator: f64,
    rng: Xorshift64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            accumulator: 0.0,
            rng: Xorshift64::new(seed),
        }
    }

    /// Time accumulated toward the next spawn.
    pub fn pending(&self) -> f64 {
        self.accumulator
    }

    /// Drops accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Adds `dt` and returns how many spawns are now due, consuming them.
    pub fn due(&mut self, dt: f64, interval: f64) -> usize {
        if !(dt.is_finite() && dt > 0.0 && interval > 0.0) {
            return 0;
        }
        self.accumulator += dt;
        let count = (self.accumulator / interval).floor();
        if count <= 0.0 {
            return 0;
        }
        if count >= MAX_SPAWNS_PER_STEP as f64 {
            self.accumulator = 0.0;
            return MAX_SPAWNS_PER_STEP;
        }
        self.accumulator -= count * interval;
        count as usize
    }

    /// A new particle at `(width, U[0, height))` moving left with a small
    /// random vertical drift.
    pub fn emit(&mut self, width: f64, height: f64, size_scale: f64, friction: f64) -> Particle {
        let y = self.rng.next_range(0.0, height);
        let vy = self.rng.next_range(-SPAWN_SPREAD_Y, SPAWN_SPREAD_Y);
        Particle::new(
            DVec2::new(width, y),
            DVec2::new(SPAWN_SPEED_X, vy),
            size_scale,
            friction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow_field::FlowParams;
    use crate::noise::{NoiseSource, PerlinNoise};

    struct Broken;

    impl NoiseSource for Broken {
        fn noise(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            f64::INFINITY
        }
    }

    fn still(x: f64, y: f64, friction: f64) -> Particle {
        Particle::new(DVec2::new(x, y), DVec2::ZERO, 1.0, friction)
    }

    fn calm_field() -> FlowField {
        FlowField::unseeded(FlowParams::default())
    }

    // -- Integration --

    #[test]
    fn directional_force_adds_velocity_without_friction() {
        let mut particles = [still(0.0, 0.0, 0.0)];
        integrate(&mut particles, &calm_field(), DVec2::new(10.0, 0.0), 1.0);
        assert_eq!(particles[0].velocity, DVec2::new(10.0, 0.0));
        assert_eq!(particles[0].position, DVec2::new(10.0, 0.0));
    }

    #[test]
    fn friction_applies_after_the_move() {
        let mut particles = [Particle::new(DVec2::ZERO, DVec2::new(8.0, 0.0), 1.0, 1.0)];
        integrate(&mut particles, &calm_field(), DVec2::ZERO, 0.5);
        // moved with the undamped velocity, then damped by 1 - 1 * 0.5
        assert_eq!(particles[0].position, DVec2::new(4.0, 0.0));
        assert_eq!(particles[0].velocity, DVec2::new(4.0, 0.0));
    }

    #[test]
    fn friction_strictly_decreases_speed_when_unforced() {
        let mut particles = [Particle::new(DVec2::ZERO, DVec2::new(3.0, -4.0), 1.0, 1.0)];
        let mut last = particles[0].velocity.length();
        for _ in 0..50 {
            integrate(&mut particles, &calm_field(), DVec2::ZERO, 0.1);
            let speed = particles[0].velocity.length();
            if last > 1e-9 {
                assert!(speed < last, "speed did not drop: {last} -> {speed}");
            }
            last = speed;
        }
    }

    #[test]
    fn frictionless_unforced_particle_keeps_its_velocity() {
        let mut particles = [Particle::new(DVec2::ZERO, DVec2::new(10.0, 0.0), 1.0, 0.0)];
        integrate(&mut particles, &calm_field(), DVec2::ZERO, 1.0);
        assert_eq!(particles[0].position, DVec2::new(10.0, 0.0));
        assert_eq!(particles[0].velocity, DVec2::new(10.0, 0.0));
    }

    #[test]
    fn flow_force_is_scaled_by_strength_and_dt() {
        let params = FlowParams {
            strength: 2.0,
            ..FlowParams::default()
        };
        let field = FlowField::new(Box::new(PerlinNoise::new(4)), params);
        let position = DVec2::new(37.0, 91.0);
        let expected = field.sample_force(position.x, position.y) * 2.0 * 0.25;

        let mut particles = [still(position.x, position.y, 0.0)];
        integrate(&mut particles, &field, DVec2::ZERO, 0.25);
        assert!((particles[0].velocity - expected).length() < 1e-12);
    }

    #[test]
    fn faulty_field_is_counted_and_neutral() {
        let field = FlowField::new(Box::new(Broken), FlowParams::default());
        let mut particles = [still(1.0, 1.0, 0.0), still(2.0, 2.0, 0.0)];
        let faults = integrate(&mut particles, &field, DVec2::new(0.0, 1.0), 1.0);
        assert_eq!(faults, 2);
        assert_eq!(particles[0].velocity, DVec2::new(0.0, 1.0));
    }

    #[test]
    fn unseeded_field_is_not_a_fault() {
        let mut particles = [still(1.0, 1.0, 0.0)];
        assert_eq!(integrate(&mut particles, &calm_field(), DVec2::ZERO, 1.0), 0);
    }

    // -- Boundary --

    #[test]
    fn cull_removes_only_particles_beyond_margin() {
        let mut store = ParticleStore::new();
        for (x, y) in [(-100.0, 0.0), (-100.5, 0.0), (50.0, 360.0), (50.0, 300.0), (400.1, 0.0)] {
            store.push(still(x, y, 0.0));
        }
        let removed = apply_boundary(&mut store, BoundaryPolicy::default(), 300.0, 200.0);
        assert_eq!(removed, 3);
        let xs: Vec<f64> = store.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![-100.0, 50.0]);
    }

    #[test]
    fn wrap_folds_positions_into_surface() {
        let mut store = ParticleStore::new();
        store.push(still(305.0, -10.0, 0.0));
        store.push(still(-1.0, 450.0, 0.0));
        let removed = apply_boundary(&mut store, BoundaryPolicy::Wrap, 300.0, 200.0);
        assert_eq!(removed, 0);
        assert_eq!(store.as_slice()[0].position, DVec2::new(5.0, 190.0));
        assert_eq!(store.as_slice()[1].position, DVec2::new(299.0, 50.0));
    }

    #[test]
    fn wrap_never_lands_on_far_edge() {
        let mut store = ParticleStore::new();
        store.push(still(-1e-17, -1e-17, 0.0));
        apply_boundary(&mut store, BoundaryPolicy::Wrap, 300.0, 200.0);
        let p = store.as_slice()[0].position;
        assert!((0.0..300.0).contains(&p.x), "wrapped x = {}", p.x);
        assert!((0.0..200.0).contains(&p.y), "wrapped y = {}", p.y);
    }

    // -- Spawning --

    #[test]
    fn spawner_catches_up_on_long_frames() {
        let mut spawner = Spawner::new(1);
        assert_eq!(spawner.due(0.625, 0.25), 2);
        assert_eq!(spawner.pending(), 0.125);
        assert_eq!(spawner.due(0.125, 0.25), 1);
        assert_eq!(spawner.pending(), 0.0);
    }

    #[test]
    fn spawner_ignores_zero_and_invalid_dt() {
        let mut spawner = Spawner::new(1);
        assert_eq!(spawner.due(0.0, 0.1), 0);
        assert_eq!(spawner.due(f64::NAN, 0.1), 0);
        assert_eq!(spawner.due(-1.0, 0.1), 0);
        assert_eq!(spawner.pending(), 0.0);
    }

    #[test]
    fn spawner_caps_catch_up() {
        let mut spawner = Spawner::new(1);
        assert_eq!(spawner.due(1e6, 0.001), MAX_SPAWNS_PER_STEP);
        assert_eq!(spawner.pending(), 0.0);
    }

    #[test]
    fn emitted_particles_enter_from_the_right_edge() {
        let mut spawner = Spawner::new(99);
        for _ in 0..200 {
            let p = spawner.emit(640.0, 480.0, 1.5, 0.2);
            assert_eq!(p.position.x, 640.0);
            assert!((0.0..480.0).contains(&p.position.y));
            assert_eq!(p.velocity.x, -100.0);
            assert!((-25.0..25.0).contains(&p.velocity.y));
            assert_eq!(p.size_scale(), 1.5);
            assert_eq!(p.friction, 0.2);
        }
    }

    #[test]
    fn same_seed_spawns_same_sequence() {
        let mut a = Spawner::new(5);
        let mut b = Spawner::new(5);
        for _ in 0..20 {
            assert_eq!(a.emit(100.0, 100.0, 1.0, 1.0), b.emit(100.0, 100.0, 1.0, 1.0));
        }
    }
}
