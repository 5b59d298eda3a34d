//! The owned simulation state and its per-frame step.
//!
//! A step runs, in order: spawning, field time advance, force integration,
//! boundary handling, grid rebuild, collision resolution and trail update.
//! Configuration changes arrive as [`Command`]s between steps.

use glam::DVec2;
use log::{debug, info, warn};

use crate::collision::resolve_collisions;
use crate::command::Command;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::flow_field::FlowField;
use crate::grid::SpatialGrid;
use crate::integrator::{apply_boundary, integrate, BoundaryPolicy, Spawner};
use crate::noise::{NoiseSource, PerlinNoise};
use crate::particle::{Particle, ParticleStore};
use crate::prng::Xorshift64;
use crate::trail::TrailBuffer;

/// Counts from one [`SimulationState::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub spawned: usize,
    pub culled: usize,
    pub collisions: usize,
    pub flow_faults: usize,
    /// Live particles after the step.
    pub particles: usize,
}

/// Everything the simulation owns between frames.
pub struct SimulationState {
    config: SimConfig,
    width: usize,
    height: usize,
    seed: u64,
    particles: ParticleStore,
    field: FlowField,
    grid: SpatialGrid,
    trail: TrailBuffer,
    spawner: Spawner,
    frames: u64,
    last_report: StepReport,
}

impl SimulationState {
    /// Creates a state over Perlin noise seeded with `seed` and lays out
    /// `config.initial_particle_count` resting particles.
    pub fn new(width: usize, height: usize, config: SimConfig, seed: u64) -> Result<Self, SimError> {
        Self::with_noise(width, height, config, seed, Box::new(PerlinNoise::new(seed)))
    }

    /// Like [`SimulationState::new`] with a caller-supplied noise source.
    pub fn with_noise(
        width: usize,
        height: usize,
        config: SimConfig,
        seed: u64,
        noise: Box<dyn NoiseSource>,
    ) -> Result<Self, SimError> {
        let config = config.sanitized()?;
        let trail = TrailBuffer::new(width, height)?;
        let field = FlowField::new(noise, config.flow_params(0.0));
        let spawn_seed = Xorshift64::new(seed).next_u64();

        let mut state = Self {
            grid: SpatialGrid::new(config.cell_size),
            config,
            width,
            height,
            seed,
            particles: ParticleStore::new(),
            field,
            trail,
            spawner: Spawner::new(spawn_seed),
            frames: 0,
            last_report: StepReport::default(),
        };
        state.seed_particles();
        info!(
            "simulation created: {width}x{height}, seed {seed}, {} particles",
            state.particles.len()
        );
        Ok(state)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Steps taken since creation.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn last_report(&self) -> StepReport {
        self.last_report
    }

    /// Applies one command. A rejected command leaves the state untouched
    /// and is logged at `warn`.
    pub fn apply(&mut self, command: Command) -> Result<(), SimError> {
        let result = self.apply_inner(&command);
        if let Err(err) = &result {
            warn!("rejected command {}: {err}", command.name());
        }
        result
    }

    fn apply_inner(&mut self, command: &Command) -> Result<(), SimError> {
        match *command {
            Command::Resize { width, height } => self.resize(width, height),
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::AddParticle { x, y } => self.add_particle(x, y),
            _ => match command.updated_config(&self.config) {
                Some(next) => {
                    self.set_config(next?);
                    Ok(())
                }
                None => Ok(()),
            },
        }
    }

    fn set_config(&mut self, next: SimConfig) {
        if self.config.trail_enabled && !next.trail_enabled {
            self.trail.clear();
        }
        let time = self.field.params().time_offset;
        *self.field.params_mut() = next.flow_params(time);
        self.config = next;
    }

    /// Changes the surface size, reallocating and clearing the trail.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SimError> {
        self.trail.resize(width, height)?;
        self.width = width;
        self.height = height;
        info!("resized to {width}x{height}");
        Ok(())
    }

    /// Drops every particle, clears the trail and reseeds the lattice.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.trail.clear();
        self.spawner.reset();
        self.seed_particles();
        info!("reset: {} particles", self.particles.len());
    }

    /// Adds a resting particle at `(x, y)` with the current size and friction.
    pub fn add_particle(&mut self, x: f64, y: f64) -> Result<(), SimError> {
        let position = DVec2::new(x, y);
        if !position.is_finite() {
            return Err(SimError::invalid_config(
                "add_particle",
                format!("position must be finite, got ({x}, {y})"),
            ));
        }
        self.particles.push(Particle::new(
            position,
            DVec2::ZERO,
            self.config.size_scale,
            self.config.friction,
        ));
        Ok(())
    }

    fn seed_particles(&mut self) {
        self.particles.seed_grid(
            self.config.initial_particle_count,
            self.width as f64,
            self.height as f64,
            self.config.size_scale,
            self.config.friction,
        );
    }

    /// Advances the simulation by `dt` seconds. Negative or non-finite `dt`
    /// is treated as 0.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let (width, height) = (self.width as f64, self.height as f64);
        let boundary = self.config.boundary();
        let mut report = StepReport::default();

        if self.config.spawn_enabled && matches!(boundary, BoundaryPolicy::Cull { .. }) {
            let due = self.spawner.due(dt, self.config.spawn_interval);
            for _ in 0..due {
                let p = self
                    .spawner
                    .emit(width, height, self.config.size_scale, self.config.friction);
                self.particles.push(p);
            }
            report.spawned = due;
        }

        self.field.advance(dt);
        report.flow_faults = integrate(
            self.particles.as_mut_slice(),
            &self.field,
            self.config.directional_force,
            dt,
        );
        report.culled = apply_boundary(&mut self.particles, boundary, width, height);

        self.grid.rebuild(self.particles.as_slice(), self.config.cell_size);
        if self.config.collisions_enabled {
            report.collisions = resolve_collisions(
                self.particles.as_mut_slice(),
                &self.grid,
                &self.config.collision_params(),
            );
        }

        if self.config.trail_enabled {
            self.update_trail();
        }

        report.particles = self.particles.len();
        self.frames += 1;
        self.last_report = report;
        debug!(
            "frame {}: dt={dt:.4} particles={} spawned={} culled={} collisions={}",
            self.frames, report.particles, report.spawned, report.culled, report.collisions
        );
        if report.flow_faults > 0 {
            debug!("frame {}: {} flow samples fell back to zero", self.frames, report.flow_faults);
        }
        report
    }

    fn update_trail(&mut self) {
        let color = self.config.trail_color.with_alpha(self.config.trail_alpha);
        let dot_radius = self.config.dot_radius;
        let mut frame = self.trail.acquire();
        frame.decay(self.config.trail_decay, self.config.trail_fade as f32);
        for p in &self.particles {
            frame.stamp_disc(p.position, p.radius(dot_radius), color);
        }
        frame.commit();
    }
}
