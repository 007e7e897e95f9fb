//! Error types for the controller.

use thiserror::Error;

/// Errors that can occur while driving an episode.
///
/// Every variant is a contract violation or an I/O failure; the controller
/// never retries. A failed call aborts the current episode.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Timestep passed to `step` was zero, negative, or non-finite.
    #[error("timestep must be positive and finite, got {dt}")]
    InvalidTimestep {
        /// The offending timestep value.
        dt: f64,
    },

    /// Raw action vector length did not match the actuator layout.
    #[error("action vector has {got} entries, expected {expected} (+2 with auxiliary flags)")]
    ActionLengthMismatch {
        /// Number of entries received.
        got: usize,
        /// Number of entries required without the auxiliary pair.
        expected: usize,
    },

    /// Name-based lookup against the robot model found no actuators.
    #[error("robot model has no actuator matching \"{pattern}\"")]
    MissingActuator {
        /// The lookup pattern that matched nothing.
        pattern: String,
    },

    /// `step` or `teardown` was called before `setup`.
    #[error("episode is not set up")]
    EpisodeNotSetUp,

    /// Invalid controller configuration.
    #[error("invalid controller configuration: {0}")]
    InvalidConfig(String),

    /// Reading the manual-parameter file failed.
    #[error("failed to read manual parameter file: {0}")]
    ManualParamsIo(#[from] std::io::Error),
}

impl ControlError {
    /// Create an invalid timestep error.
    pub fn invalid_timestep(dt: f64) -> Self {
        Self::InvalidTimestep { dt }
    }

    /// Create an action length mismatch error.
    pub fn action_length_mismatch(got: usize, expected: usize) -> Self {
        Self::ActionLengthMismatch { got, expected }
    }

    /// Create a missing actuator error.
    pub fn missing_actuator(pattern: impl Into<String>) -> Self {
        Self::MissingActuator {
            pattern: pattern.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
