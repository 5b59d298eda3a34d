//! Pairwise overlap correction and elastic impulse between particles.

use glam::DVec2;

use crate::grid::{PairPolicy, SpatialGrid};
use crate::particle::Particle;

/// Collision settings read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionParams {
    /// Base radius; each particle's radius is `dot_radius * size_scale`.
    pub dot_radius: f64,
    /// Apply the velocity impulse in addition to positional correction.
    pub elastic: bool,
    pub policy: PairPolicy,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            dot_radius: 5.0,
            elastic: true,
            policy: PairPolicy::Unique,
        }
    }
}

/// Resolves every overlapping candidate pair from `grid`.
///
/// `grid` must have been rebuilt from `particles` this frame. Distances are
/// computed from current positions, so under [`PairPolicy::Revisit`] the
/// second visit of a pair sees the first correction. Returns the number of
/// pair resolutions performed.
pub fn resolve_collisions(
    particles: &mut [Particle],
    grid: &SpatialGrid,
    params: &CollisionParams,
) -> usize {
    let mut resolved = 0;
    grid.for_each_candidate_pair(params.policy, |i, j| {
        let Some((a, b)) = pair_mut(particles, i, j) else {
            return;
        };
        if resolve_pair(a, b, params.dot_radius, params.elastic) {
            resolved += 1;
        }
    });
    resolved
}

/// Separates `a` and `b` if their discs overlap, then applies the elastic
/// impulse when they are approaching.
///
/// Returns `false` without touching either particle when they do not
/// overlap or their centres coincide.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle, dot_radius: f64, elastic: bool) -> bool {
    let delta = b.position - a.position;
    let distance = delta.length();
    let reach = a.radius(dot_radius) + b.radius(dot_radius);
    if distance == 0.0 || distance.is_nan() || distance >= reach {
        return false;
    }

    let normal = delta / distance;
    let correction = normal * ((reach - distance) / 2.0);
    a.position -= correction;
    b.position += correction;

    if elastic {
        apply_impulse(a, b, normal);
    }
    true
}

fn apply_impulse(a: &mut Particle, b: &mut Particle, normal: DVec2) {
    let closing = (b.velocity - a.velocity).dot(normal);
    if closing >= 0.0 {
        return;
    }
    let impulse = -2.0 * closing / (a.mass() + b.mass());
    a.velocity -= normal * (impulse * b.mass());
    b.velocity += normal * (impulse * a.mass());
}

/// Two distinct mutable elements of `items`, in the order requested.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i.max(j) >= items.len() {
        return None;
    }
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = items.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}
