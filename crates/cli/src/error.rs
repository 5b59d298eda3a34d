//! CLI errors and their exit codes.
//!
//! - 0:  success
//! - 2:  argument parse error (raised by clap before `run`)
//! - 10: simulation error (bad dimensions, rejected configuration)
//! - 11: I/O error (reading a scene file, writing the PNG)
//! - 12: input error (malformed `--params` or scene JSON)
//! - 13: serialization error (JSON output)

use flow_particles_core::SimError;
use std::fmt;

/// Errors produced by CLI operations, each with its own exit code.
#[derive(Debug)]
pub enum CliError {
    Simulation(SimError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Simulation(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Simulation(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Io(msg) => CliError::Io(msg),
            SimError::InvalidColor(msg) => CliError::Input(format!("invalid color: {msg}")),
            other => CliError::Simulation(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            CliError::Simulation(SimError::InvalidDimensions),
            CliError::Io("x".into()),
            CliError::Input("x".into()),
            CliError::Serialization("x".into()),
        ];
        let codes: Vec<i32> = errors.iter().map(CliError::exit_code).collect();
        assert_eq!(codes, vec![10, 11, 12, 13]);
    }

    #[test]
    fn sim_io_error_routes_to_io() {
        let err = CliError::from(SimError::Io("disk full".into()));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn bad_color_is_an_input_error() {
        let err = CliError::from(SimError::InvalidColor("expected 6 hex digits".into()));
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn rejected_config_is_a_simulation_error() {
        let err = CliError::from(SimError::invalid_config("dt", "must be finite"));
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("dt"));
    }

    #[test]
    fn serde_json_error_routes_to_serialization() {
        let bad = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert_eq!(CliError::from(bad).exit_code(), 13);
    }
}
