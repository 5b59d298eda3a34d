#![deny(unsafe_code)]
//! Simulation core for flow-particles: dots pushed around a 2D surface by a
//! time-varying noise flow field.
//!
//! Provides seeded `PerlinNoise` (over the `noise` crate) and `FlowField`, the
//! `ParticleStore`, `SpatialGrid` neighbour queries, force integration and
//! collision resolution, the `TrailBuffer` accumulator, `SimConfig` with its
//! `Command`s, and the `FrameLoop` that ties them to a `RenderSurface`.

pub mod clock;
pub mod collision;
pub mod color;
pub mod command;
pub mod config;
pub mod error;
pub mod flow_field;
pub mod grid;
pub mod integrator;
pub mod noise;
pub mod params;
pub mod particle;
pub mod prng;
pub mod scene;
pub mod scheduler;
pub mod simulation;
pub mod surface;
pub mod trail;

pub use clock::FrameClock;
pub use collision::{resolve_collisions, CollisionParams};
pub use color::{Rgba, Srgb};
pub use command::Command;
pub use config::SimConfig;
pub use error::SimError;
pub use flow_field::{FlowField, FlowParams, Segment};
pub use grid::{PairPolicy, SpatialGrid};
pub use integrator::{BoundaryPolicy, Spawner};
pub use crate::noise::{NoiseSource, PerlinNoise};
pub use particle::{Particle, ParticleStore};
pub use prng::Xorshift64;
pub use scene::{SceneSpec, ScheduledCommand};
pub use scheduler::{FrameLoop, FrameReport};
pub use simulation::{SimulationState, StepReport};
pub use surface::{render_frame, RenderSurface};
pub use trail::{TrailBuffer, TrailDecay, TrailFrame};
