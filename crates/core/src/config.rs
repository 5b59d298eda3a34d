//! Live-tunable simulation settings.
//!
//! [`SimConfig`] is the single source of every tunable value. It is built
//! from defaults, from a JSON object via [`SimConfig::from_json`], or by
//! applying [`crate::command::Command`]s. Every path funnels through
//! [`SimConfig::sanitized`], which rejects non-finite numbers and clamps
//! the rest into range.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::collision::CollisionParams;
use crate::color::Srgb;
use crate::error::SimError;
use crate::flow_field::FlowParams;
use crate::grid::{PairPolicy, DEFAULT_CELL_SIZE};
use crate::integrator::{BoundaryPolicy, DEFAULT_CULL_MARGIN};
use crate::params::{param_bool, param_f64, param_parsed, param_string, param_usize, param_vec2};
use crate::trail::TrailDecay;

pub const SIZE_SCALE_RANGE: (f64, f64) = (0.01, 100.0);
pub const MIN_FLOW_SCALE: f64 = 1e-6;
pub const MIN_SPAWN_INTERVAL: f64 = 1e-4;
pub const MIN_CELL_SIZE: f64 = 1.0;
pub const MIN_DOT_RADIUS: f64 = 0.1;
/// Upper bound on the lattice laid out by construction and reset.
pub const MAX_INITIAL_PARTICLES: usize = 100_000;

/// All tunable simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Size multiplier for new particles; mass is its cube.
    pub size_scale: f64,
    /// Velocity decay rate per second for new particles.
    pub friction: f64,
    pub flow_strength: f64,
    pub flow_scale: f64,
    pub flow_speed: f64,
    /// Constant acceleration applied to every particle.
    pub directional_force: DVec2,
    /// Seconds between spawns.
    pub spawn_interval: f64,
    pub spawn_enabled: bool,
    pub trail_enabled: bool,
    pub trail_fade: f64,
    pub trail_decay: TrailDecay,
    pub trail_alpha: f64,
    pub collisions_enabled: bool,
    pub elastic_collisions: bool,
    pub pair_policy: PairPolicy,
    pub show_dots: bool,
    pub show_arrows: bool,
    pub wrap_particles: bool,
    pub dot_color: Srgb,
    pub trail_color: Srgb,
    pub dot_radius: f64,
    pub cell_size: f64,
    pub cull_margin: f64,
    pub initial_particle_count: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        let flow = FlowParams::default();
        Self {
            size_scale: 1.0,
            friction: 1.0,
            flow_strength: flow.strength,
            flow_scale: flow.scale,
            flow_speed: flow.speed,
            directional_force: DVec2::new(-200.0, 0.0),
            spawn_interval: 0.001,
            spawn_enabled: true,
            trail_enabled: false,
            trail_fade: 0.98,
            trail_decay: TrailDecay::Exponential,
            trail_alpha: 0.1,
            collisions_enabled: false,
            elastic_collisions: true,
            pair_policy: PairPolicy::Unique,
            show_dots: true,
            show_arrows: true,
            wrap_particles: false,
            dot_color: Srgb::BLACK,
            trail_color: Srgb::BLACK,
            dot_radius: 5.0,
            cell_size: DEFAULT_CELL_SIZE,
            cull_margin: DEFAULT_CULL_MARGIN,
            initial_particle_count: 1000,
        }
    }
}

impl SimConfig {
    /// Reads a config from a JSON object.
    ///
    /// Missing or mistyped keys keep their defaults. Color strings that are
    /// present but unparseable are an error, as are values rejected by
    /// [`SimConfig::sanitized`].
    pub fn from_json(params: &Value) -> Result<Self, SimError> {
        let d = Self::default();
        let color = |name: &str, default: Srgb| -> Result<Srgb, SimError> {
            match param_string(params, name, "").as_str() {
                "" => Ok(default),
                hex => Srgb::from_hex(hex),
            }
        };

        Self {
            size_scale: param_f64(params, "size_scale", d.size_scale),
            friction: param_f64(params, "friction", d.friction),
            flow_strength: param_f64(params, "flow_strength", d.flow_strength),
            flow_scale: param_f64(params, "flow_scale", d.flow_scale),
            flow_speed: param_f64(params, "flow_speed", d.flow_speed),
            directional_force: param_vec2(params, "directional_force", d.directional_force),
            spawn_interval: param_f64(params, "spawn_interval", d.spawn_interval),
            spawn_enabled: param_bool(params, "spawn_enabled", d.spawn_enabled),
            trail_enabled: param_bool(params, "trail_enabled", d.trail_enabled),
            trail_fade: param_f64(params, "trail_fade", d.trail_fade),
            trail_decay: param_parsed(params, "trail_decay", d.trail_decay),
            trail_alpha: param_f64(params, "trail_alpha", d.trail_alpha),
            collisions_enabled: param_bool(params, "collisions_enabled", d.collisions_enabled),
            elastic_collisions: param_bool(params, "elastic_collisions", d.elastic_collisions),
            pair_policy: param_parsed(params, "pair_policy", d.pair_policy),
            show_dots: param_bool(params, "show_dots", d.show_dots),
            show_arrows: param_bool(params, "show_arrows", d.show_arrows),
            wrap_particles: param_bool(params, "wrap_particles", d.wrap_particles),
            dot_color: color("dot_color", d.dot_color)?,
            trail_color: color("trail_color", d.trail_color)?,
            dot_radius: param_f64(params, "dot_radius", d.dot_radius),
            cell_size: param_f64(params, "cell_size", d.cell_size),
            cull_margin: param_f64(params, "cull_margin", d.cull_margin),
            initial_particle_count: param_usize(
                params,
                "initial_particle_count",
                d.initial_particle_count,
            ),
        }
        .sanitized()
    }

    /// Rejects non-finite numbers, then clamps every numeric field into its
    /// documented range.
    pub fn sanitized(mut self) -> Result<Self, SimError> {
        for (name, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(SimError::invalid_config(
                    name,
                    format!("must be finite, got {value}"),
                ));
            }
        }

        self.size_scale = self.size_scale.clamp(SIZE_SCALE_RANGE.0, SIZE_SCALE_RANGE.1);
        self.friction = self.friction.max(0.0);
        self.flow_scale = self.flow_scale.max(MIN_FLOW_SCALE);
        self.spawn_interval = self.spawn_interval.max(MIN_SPAWN_INTERVAL);
        self.trail_fade = self.trail_fade.clamp(0.0, 1.0);
        self.trail_alpha = self.trail_alpha.clamp(0.0, 1.0);
        self.dot_radius = self.dot_radius.max(MIN_DOT_RADIUS);
        self.cell_size = self.cell_size.max(MIN_CELL_SIZE);
        self.cull_margin = self.cull_margin.max(0.0);
        self.initial_particle_count = self.initial_particle_count.min(MAX_INITIAL_PARTICLES);
        Ok(self)
    }

    fn numeric_fields(&self) -> [(&'static str, f64); 13] {
        [
            ("size_scale", self.size_scale),
            ("friction", self.friction),
            ("flow_strength", self.flow_strength),
            ("flow_scale", self.flow_scale),
            ("flow_speed", self.flow_speed),
            ("directional_force.x", self.directional_force.x),
            ("directional_force.y", self.directional_force.y),
            ("spawn_interval", self.spawn_interval),
            ("trail_fade", self.trail_fade),
            ("trail_alpha", self.trail_alpha),
            ("dot_radius", self.dot_radius),
            ("cell_size", self.cell_size),
            ("cull_margin", self.cull_margin),
        ]
    }

    /// Flow parameters for this config at field time `time_offset`.
    pub fn flow_params(&self, time_offset: f64) -> FlowParams {
        FlowParams {
            scale: self.flow_scale,
            time_offset,
            speed: self.flow_speed,
            strength: self.flow_strength,
        }
    }

    pub fn collision_params(&self) -> CollisionParams {
        CollisionParams {
            dot_radius: self.dot_radius,
            elastic: self.elastic_collisions,
            policy: self.pair_policy,
        }
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        if self.wrap_particles {
            BoundaryPolicy::Wrap
        } else {
            BoundaryPolicy::Cull {
                margin: self.cull_margin,
            }
        }
    }

    /// Describes every parameter: type, default, range and purpose.
    pub fn param_schema() -> Value {
        let d = Self::default();
        let f = |default: f64, min: Option<f64>, max: Option<f64>, description: &str| {
            let mut entry = json!({"type": "f64", "default": default, "description": description});
            if let Some(min) = min {
                entry["min"] = json!(min);
            }
            if let Some(max) = max {
                entry["max"] = json!(max);
            }
            entry
        };
        let flag = |default: bool, description: &str| {
            json!({"type": "bool", "default": default, "description": description})
        };
        let choice = |default: &str, values: [&str; 2], description: &str| {
            json!({"type": "enum", "default": default, "values": values, "description": description})
        };
        let color = |default: Srgb, description: &str| {
            json!({"type": "color", "default": default.to_hex(), "description": description})
        };

        let entries = [
            (
                "size_scale",
                f(
                    d.size_scale,
                    Some(SIZE_SCALE_RANGE.0),
                    Some(SIZE_SCALE_RANGE.1),
                    "Size of new particles; mass grows with its cube",
                ),
            ),
            (
                "friction",
                f(
                    d.friction,
                    Some(0.0),
                    None,
                    "Velocity decay per second for new particles",
                ),
            ),
            (
                "flow_strength",
                f(
                    d.flow_strength,
                    None,
                    None,
                    "Multiplier on the sampled flow force",
                ),
            ),
            (
                "flow_scale",
                f(
                    d.flow_scale,
                    Some(MIN_FLOW_SCALE),
                    None,
                    "Spatial frequency of the flow field; smaller is smoother",
                ),
            ),
            (
                "flow_speed",
                f(d.flow_speed, None, None, "Field time advanced per second"),
            ),
            (
                "directional_force",
                json!({
                    "type": "[f64, f64]",
                    "default": [d.directional_force.x, d.directional_force.y],
                    "description": "Constant acceleration applied to every particle"
                }),
            ),
            (
                "spawn_interval",
                f(
                    d.spawn_interval,
                    Some(MIN_SPAWN_INTERVAL),
                    None,
                    "Seconds between spawns at the right edge",
                ),
            ),
            (
                "spawn_enabled",
                flag(
                    d.spawn_enabled,
                    "Spawn new particles (ignored while wrapping)",
                ),
            ),
            (
                "trail_enabled",
                flag(d.trail_enabled, "Accumulate fading motion trails"),
            ),
            (
                "trail_fade",
                f(
                    d.trail_fade,
                    Some(0.0),
                    Some(1.0),
                    "Per-frame trail persistence",
                ),
            ),
            (
                "trail_decay",
                choice(
                    "exponential",
                    ["exponential", "linear"],
                    "Multiply alpha by trail_fade, or subtract 1 - trail_fade",
                ),
            ),
            (
                "trail_alpha",
                f(
                    d.trail_alpha,
                    Some(0.0),
                    Some(1.0),
                    "Opacity of each trail stamp",
                ),
            ),
            (
                "collisions_enabled",
                flag(
                    d.collisions_enabled,
                    "Resolve overlaps between particles",
                ),
            ),
            (
                "elastic_collisions",
                flag(
                    d.elastic_collisions,
                    "Exchange momentum on collision, not just separate",
                ),
            ),
            (
                "pair_policy",
                choice(
                    "unique",
                    ["unique", "revisit"],
                    "Visit each colliding pair once, or twice per frame",
                ),
            ),
            ("show_dots", flag(d.show_dots, "Draw particles")),
            ("show_arrows", flag(d.show_arrows, "Draw flow field arrows")),
            (
                "wrap_particles",
                flag(d.wrap_particles, "Wrap at edges instead of culling"),
            ),
            ("dot_color", color(d.dot_color, "Particle color")),
            ("trail_color", color(d.trail_color, "Trail color")),
            (
                "dot_radius",
                f(
                    d.dot_radius,
                    Some(MIN_DOT_RADIUS),
                    None,
                    "Base particle radius before size_scale",
                ),
            ),
            (
                "cell_size",
                f(
                    d.cell_size,
                    Some(MIN_CELL_SIZE),
                    None,
                    "Spatial grid cell edge length",
                ),
            ),
            (
                "cull_margin",
                f(
                    d.cull_margin,
                    Some(0.0),
                    None,
                    "Distance past the edge before particles are removed",
                ),
            ),
            (
                "initial_particle_count",
                json!({
                    "type": "usize",
                    "default": d.initial_particle_count,
                    "min": 0,
                    "max": MAX_INITIAL_PARTICLES,
                    "description": "Particles laid out on reset"
                }),
            ),
        ];

        Value::Object(
            entries
                .into_iter()
                .map(|(name, entry)| (name.to_string(), entry))
                .collect(),
        )
    }
}
