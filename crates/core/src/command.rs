//! Messages that change the simulation between frames.
//!
//! Hosts never touch [`crate::simulation::SimulationState`] mid-frame; they
//! queue a [`Command`] and the frame loop applies it at the next boundary.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::Srgb;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::grid::PairPolicy;
use crate::trail::TrailDecay;

/// One requested change. Setting variants map one-to-one onto
/// [`SimConfig`] fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    SizeScale(f64),
    Friction(f64),
    FlowStrength(f64),
    FlowScale(f64),
    FlowSpeed(f64),
    DirectionalForce(DVec2),
    SpawnInterval(f64),
    SpawnEnabled(bool),
    TrailEnabled(bool),
    TrailFade(f64),
    TrailDecay(TrailDecay),
    TrailAlpha(f64),
    CollisionsEnabled(bool),
    ElasticCollisions(bool),
    PairPolicy(PairPolicy),
    ShowDots(bool),
    ShowArrows(bool),
    WrapParticles(bool),
    DotColor(Srgb),
    TrailColor(Srgb),
    DotRadius(f64),
    CellSize(f64),
    CullMargin(f64),
    InitialParticleCount(usize),
    /// Resize the surface; takes effect at the next frame boundary.
    Resize { width: usize, height: usize },
    /// Drop every particle and the trail, reseed the initial lattice.
    Reset,
    /// Add a resting particle at a point (a click, in an interactive host).
    AddParticle { x: f64, y: f64 },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SizeScale(_) => "size_scale",
            Command::Friction(_) => "friction",
            Command::FlowStrength(_) => "flow_strength",
            Command::FlowScale(_) => "flow_scale",
            Command::FlowSpeed(_) => "flow_speed",
            Command::DirectionalForce(_) => "directional_force",
            Command::SpawnInterval(_) => "spawn_interval",
            Command::SpawnEnabled(_) => "spawn_enabled",
            Command::TrailEnabled(_) => "trail_enabled",
            Command::TrailFade(_) => "trail_fade",
            Command::TrailDecay(_) => "trail_decay",
            Command::TrailAlpha(_) => "trail_alpha",
            Command::CollisionsEnabled(_) => "collisions_enabled",
            Command::ElasticCollisions(_) => "elastic_collisions",
            Command::PairPolicy(_) => "pair_policy",
            Command::ShowDots(_) => "show_dots",
            Command::ShowArrows(_) => "show_arrows",
            Command::WrapParticles(_) => "wrap_particles",
            Command::DotColor(_) => "dot_color",
            Command::TrailColor(_) => "trail_color",
            Command::DotRadius(_) => "dot_radius",
            Command::CellSize(_) => "cell_size",
            Command::CullMargin(_) => "cull_margin",
            Command::InitialParticleCount(_) => "initial_particle_count",
            Command::Resize { .. } => "resize",
            Command::Reset => "reset",
            Command::AddParticle { .. } => "add_particle",
        }
    }

    /// For setting variants, `config` with the change applied and
    /// sanitized. `None` for structural commands (resize, reset, add).
    ///
    /// `config` itself is never modified, so a rejected value leaves the
    /// caller's state as it was.
    pub fn updated_config(&self, config: &SimConfig) -> Option<Result<SimConfig, SimError>> {
        let mut next = config.clone();
        match *self {
            Command::SizeScale(v) => next.size_scale = v,
            Command::Friction(v) => next.friction = v,
            Command::FlowStrength(v) => next.flow_strength = v,
            Command::FlowScale(v) => next.flow_scale = v,
            Command::FlowSpeed(v) => next.flow_speed = v,
            Command::DirectionalForce(v) => next.directional_force = v,
            Command::SpawnInterval(v) => next.spawn_interval = v,
            Command::SpawnEnabled(v) => next.spawn_enabled = v,
            Command::TrailEnabled(v) => next.trail_enabled = v,
            Command::TrailFade(v) => next.trail_fade = v,
            Command::TrailDecay(v) => next.trail_decay = v,
            Command::TrailAlpha(v) => next.trail_alpha = v,
            Command::CollisionsEnabled(v) => next.collisions_enabled = v,
            Command::ElasticCollisions(v) => next.elastic_collisions = v,
            Command::PairPolicy(v) => next.pair_policy = v,
            Command::ShowDots(v) => next.show_dots = v,
            Command::ShowArrows(v) => next.show_arrows = v,
            Command::WrapParticles(v) => next.wrap_particles = v,
            Command::DotColor(v) => next.dot_color = v,
            Command::TrailColor(v) => next.trail_color = v,
            Command::DotRadius(v) => next.dot_radius = v,
            Command::CellSize(v) => next.cell_size = v,
            Command::CullMargin(v) => next.cull_margin = v,
            Command::InitialParticleCount(v) => next.initial_particle_count = v,
            Command::Resize { .. } | Command::Reset | Command::AddParticle { .. } => return None,
        }
        Some(next.sanitized())
    }
}
