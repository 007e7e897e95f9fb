//! Controller and evolution-run configuration.

use std::path::{Path, PathBuf};

use crate::error::ControlError;
use crate::metrics::DisplacementAxis;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a [`LearningController`](crate::LearningController).
///
/// Defaults match the reference DuCTT-class robot: two muscle clusters of
/// four actuators each and two prismatic joints, driven at 1 kHz.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Initial commanded length for every muscle at setup (model units).
    pub initial_length: f64,

    /// Number of muscle clusters, each sharing one sine-wave law.
    pub n_clusters: usize,

    /// Number of muscle actuators per cluster.
    pub muscles_per_cluster: usize,

    /// Number of prismatic joints (bottom first, then top).
    pub n_prisms: usize,

    /// Axis mode used for the displacement fitness term.
    pub axis: DisplacementAxis,

    /// Physics tick rate (Hz). The hysteresis window is debounced in ticks,
    /// so this must match the rate at which the driver calls `step`.
    pub tick_rate_hz: f64,

    /// Startup settling window during which normal actuation is suspended (s).
    pub settle_seconds: f64,

    /// Default hysteresis window for the locking state machine (s).
    /// Overwritten per episode when the action vector carries the
    /// auxiliary hysteresis scalar.
    pub hysteresis_seconds: f64,

    /// Whether touch-sensor gating of the prismatic joints starts disabled.
    /// Overwritten per episode when the action vector carries the
    /// auxiliary touch flag.
    pub ignore_touch_sensors: bool,

    /// Whether the surrounding run is in learning mode (consumed from the
    /// evolution settings file; forwarded to diagnostics only).
    pub learning: bool,

    /// Optional manual-parameter file. When set, the action vector from the
    /// learning adapter is replaced by line `episode` of this file.
    pub manual_params: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_length: 5.0,
            n_clusters: 2,
            muscles_per_cluster: 4,
            n_prisms: 2,
            axis: DisplacementAxis::SignedY,
            tick_rate_hz: 1000.0,
            settle_seconds: 3.0,
            hysteresis_seconds: 0.5,
            ignore_touch_sensors: true,
            learning: false,
            manual_params: None,
        }
    }
}

impl ControllerConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial muscle length.
    #[must_use]
    pub fn with_initial_length(mut self, length: f64) -> Self {
        self.initial_length = length;
        self
    }

    /// Set the displacement axis mode.
    #[must_use]
    pub fn with_axis(mut self, axis: DisplacementAxis) -> Self {
        self.axis = axis;
        self
    }

    /// Set the physics tick rate (Hz).
    #[must_use]
    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Set the startup settling window (s).
    #[must_use]
    pub fn with_settle_seconds(mut self, seconds: f64) -> Self {
        self.settle_seconds = seconds;
        self
    }

    /// Set the default hysteresis window (s).
    #[must_use]
    pub fn with_hysteresis_seconds(mut self, seconds: f64) -> Self {
        self.hysteresis_seconds = seconds;
        self
    }

    /// Enable or disable touch-sensor gating by default.
    #[must_use]
    pub fn with_ignore_touch_sensors(mut self, ignore: bool) -> Self {
        self.ignore_touch_sensors = ignore;
        self
    }

    /// Set the manual-parameter file.
    #[must_use]
    pub fn with_manual_params(mut self, path: impl Into<PathBuf>) -> Self {
        self.manual_params = Some(path.into());
        self
    }

    /// Apply the `learning` flag from evolution settings.
    #[must_use]
    pub fn with_evolution_settings(mut self, settings: &EvolutionSettings) -> Self {
        self.learning = settings.learning;
        self
    }

    /// Number of actuator groups (clusters plus prismatic joints).
    #[must_use]
    pub fn n_actions(&self) -> usize {
        self.n_clusters + self.n_prisms
    }

    /// Expected raw action-vector length without the auxiliary pair.
    #[must_use]
    pub fn expected_raw_len(&self) -> usize {
        self.n_actions() * crate::params::N_PARAMS
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidConfig`] for non-positive tick rates,
    /// negative windows, or an empty actuator layout.
    pub fn validate(&self) -> Result<()> {
        if !(self.tick_rate_hz > 0.0) || !self.tick_rate_hz.is_finite() {
            return Err(ControlError::invalid_config(format!(
                "tick rate must be positive and finite, got {}",
                self.tick_rate_hz
            )));
        }
        if self.settle_seconds < 0.0 {
            return Err(ControlError::invalid_config(
                "settle window must be non-negative",
            ));
        }
        if self.hysteresis_seconds < 0.0 {
            return Err(ControlError::invalid_config(
                "hysteresis window must be non-negative",
            ));
        }
        if self.n_actions() == 0 {
            return Err(ControlError::invalid_config(
                "controller needs at least one actuator group",
            ));
        }
        if self.n_prisms > 2 {
            return Err(ControlError::invalid_config(
                "at most two prismatic joints (bottom, top) are supported",
            ));
        }
        Ok(())
    }
}

/// Settings consumed from the evolution-run configuration file.
///
/// The file is plain `key = value` text, one pair per line, with `#`
/// comments. Only the keys the controller cares about are decoded; unknown
/// keys are ignored so the same file can configure the external optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvolutionSettings {
    /// Whether the optimizer is learning (exploring) or replaying.
    pub learning: bool,
}

impl EvolutionSettings {
    /// Parse settings from key-value text.
    #[must_use]
    pub fn from_key_values(text: &str) -> Self {
        let mut settings = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() == "learning" {
                settings.learning = parse_bool(value.trim());
            }
        }
        settings
    }

    /// Read settings from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::ManualParamsIo`] when the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_key_values(&text))
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "True" | "TRUE" | "yes")
}
