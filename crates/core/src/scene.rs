//! Reproducible description of an offline run.
//!
//! A [`SceneSpec`] captures everything needed to replay a simulation:
//! surface size, parameter overrides, noise seed, frame count, fixed step
//! and any commands to inject at given frames. The same scene always yields
//! the same particle trajectories.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::simulation::SimulationState;

/// Default fixed step, one 60 Hz frame.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// A command to submit before frame `frame` (0-based) runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub frame: usize,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    pub width: usize,
    pub height: usize,
    /// Overrides for [`SimConfig`] keys; see [`SimConfig::from_json`].
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<ScheduledCommand>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_dt() -> f64 {
    DEFAULT_DT
}

impl SceneSpec {
    /// A scene with default params, no frames and the default step.
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            params: empty_object(),
            seed,
            frames: 0,
            dt: DEFAULT_DT,
            commands: Vec::new(),
        }
    }

    /// Checks dimensions and step size.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(SimError::InvalidDimensions)?;
        if !(self.dt.is_finite() && self.dt >= 0.0) {
            return Err(SimError::invalid_config(
                "dt",
                format!("must be finite and non-negative, got {}", self.dt),
            ));
        }
        Ok(())
    }

    /// The scene's parameters merged over the defaults.
    pub fn config(&self) -> Result<SimConfig, SimError> {
        SimConfig::from_json(&self.params)
    }

    /// Validates the scene and builds its initial state.
    pub fn build_state(&self) -> Result<SimulationState, SimError> {
        self.validate()?;
        SimulationState::new(self.width, self.height, self.config()?, self.seed)
    }

    /// Commands scheduled for frame `frame`, in file order.
    pub fn commands_for(&self, frame: usize) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(move |c| c.frame == frame)
            .map(|c| &c.command)
    }
}
