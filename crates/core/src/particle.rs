//! Particles and the store that owns them.

use glam::DVec2;

/// A simulated dot.
///
/// `mass` is derived from `size_scale` at construction (`size_scale^3`, i.e.
/// proportional to volume) and kept in sync by [`Particle::set_size_scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    size_scale: f64,
    mass: f64,
    pub friction: f64,
}

impl Particle {
    /// Creates a particle. `size_scale` is expected to be positive; the
    /// configuration layer enforces that before any particle is created.
    pub fn new(position: DVec2, velocity: DVec2, size_scale: f64, friction: f64) -> Self {
        Self {
            position,
            velocity,
            size_scale,
            mass: size_scale.powi(3),
            friction,
        }
    }

    pub fn size_scale(&self) -> f64 {
        self.size_scale
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Updates the size scale and the derived mass together.
    pub fn set_size_scale(&mut self, size_scale: f64) {
        self.size_scale = size_scale;
        self.mass = size_scale.powi(3);
    }

    /// Effective collision and drawing radius for a base `dot_radius`.
    pub fn radius(&self, dot_radius: f64) -> f64 {
        dot_radius * self.size_scale
    }

    pub fn momentum(&self) -> DVec2 {
        self.velocity * self.mass
    }
}

/// Contiguous, index-addressed particle storage.
///
/// Indices are stable only within a frame: culling compacts the vector in
/// place (order-preserving), and the spatial grid is rebuilt afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Removes every particle, keeping the allocation.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Keeps only particles matching `keep`, compacting in place.
    ///
    /// Returns the number removed.
    pub fn retain(&mut self, keep: impl FnMut(&Particle) -> bool) -> usize {
        let before = self.particles.len();
        self.particles.retain(keep);
        before - self.particles.len()
    }

    /// Lays `count` resting particles on a lattice over a `width` x `height`
    /// area: `cols = ceil(sqrt(count))`, `rows = ceil(count / cols)`, one
    /// particle at the centre of each lattice cell, filled row by row.
    pub fn seed_grid(
        &mut self,
        count: usize,
        width: f64,
        height: f64,
        size_scale: f64,
        friction: f64,
    ) {
        if count == 0 {
            return;
        }
        let cols = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(cols);
        let spacing = DVec2::new(width / cols as f64, height / rows as f64);

        self.particles.reserve(count);
        for i in 0..count {
            let cell = DVec2::new((i % cols) as f64, (i / cols) as f64);
            let position = cell * spacing + spacing / 2.0;
            self.particles
                .push(Particle::new(position, DVec2::ZERO, size_scale, friction));
        }
    }

    /// Total momentum of all particles.
    pub fn total_momentum(&self) -> DVec2 {
        self.particles.iter().map(Particle::momentum).sum()
    }
}

impl<'a> IntoIterator for &'a ParticleStore {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_is_cube_of_size_scale() {
        let p = Particle::new(DVec2::ZERO, DVec2::ZERO, 2.0, 1.0);
        assert_eq!(p.mass(), 8.0);
    }

    #[test]
    fn set_size_scale_updates_mass() {
        let mut p = Particle::new(DVec2::ZERO, DVec2::ZERO, 1.0, 1.0);
        p.set_size_scale(3.0);
        assert_eq!(p.size_scale(), 3.0);
        assert_eq!(p.mass(), 27.0);
    }

    #[test]
    fn radius_scales_dot_radius() {
        let p = Particle::new(DVec2::ZERO, DVec2::ZERO, 1.5, 0.0);
        assert_eq!(p.radius(5.0), 7.5);
    }

    #[test]
    fn seed_grid_places_count_particles_at_cell_centres() {
        let mut store = ParticleStore::new();
        store.seed_grid(100, 1000.0, 500.0, 1.0, 0.0);
        assert_eq!(store.len(), 100);
        // 10 x 10 lattice: spacing (100, 50), first centre (50, 25)
        assert_eq!(store.as_slice()[0].position, DVec2::new(50.0, 25.0));
        assert_eq!(store.as_slice()[11].position, DVec2::new(150.0, 75.0));
        assert!(store.iter().all(|p| p.velocity == DVec2::ZERO));
    }

    #[test]
    fn seed_grid_non_square_count() {
        let mut store = ParticleStore::new();
        store.seed_grid(7, 300.0, 300.0, 1.0, 1.0);
        // cols = 3, rows = 3
        assert_eq!(store.len(), 7);
        assert_eq!(store.as_slice()[6].position, DVec2::new(50.0, 250.0));
        assert!(store
            .iter()
            .all(|p| p.position.x > 0.0 && p.position.x < 300.0));
    }

    #[test]
    fn seed_grid_zero_count_is_noop() {
        let mut store = ParticleStore::new();
        store.seed_grid(0, 100.0, 100.0, 1.0, 1.0);
        assert!(store.is_empty());
    }

    #[test]
    fn retain_preserves_order_and_reports_removed() {
        let mut store = ParticleStore::new();
        for x in 0..6 {
            store.push(Particle::new(
                DVec2::new(x as f64, 0.0),
                DVec2::ZERO,
                1.0,
                0.0,
            ));
        }
        let removed = store.retain(|p| p.position.x as i32 % 2 == 0);
        assert_eq!(removed, 3);
        let xs: Vec<f64> = store.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn total_momentum_sums_mass_weighted_velocity() {
        let mut store = ParticleStore::new();
        store.push(Particle::new(DVec2::ZERO, DVec2::new(1.0, 0.0), 2.0, 0.0));
        store.push(Particle::new(DVec2::ZERO, DVec2::new(-8.0, 1.0), 1.0, 0.0));
        assert_eq!(store.total_momentum(), DVec2::new(0.0, 1.0));
    }
}
