//! Parameter transformation.
//!
//! The learning adapter produces a flat vector of values in `[0, 1]`. This
//! module scales it into one set of sine-wave parameters per actuator group,
//! and decodes the optional trailing pair of auxiliary scalars (touch-sensor
//! flag and hysteresis window).

use std::f64::consts::PI;
use std::path::Path;

use rand::Rng;
use tracing::warn;

use crate::error::ControlError;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of sine-wave parameters per actuator group.
pub const N_PARAMS: usize = 4;

/// Lower bound of each channel: amplitude, angular frequency (Hz),
/// phase change (rad), dc offset.
pub const CHANNEL_MIN: [f64; N_PARAMS] = [0.0, 0.3, -PI, 0.0];

/// Upper bound of each channel.
pub const CHANNEL_MAX: [f64; N_PARAMS] = [40.0, 20.0, PI, 40.0];

/// Range of the auxiliary hysteresis scalar (seconds).
const HYSTERESIS_MIN: f64 = 0.0;
const HYSTERESIS_MAX: f64 = 2.0;

/// Magnitude of the perturbation applied to manually-specified parameters.
const MANUAL_PERTURBATION: f64 = 0.005;

/// Sine-wave parameters for one actuator group.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SineParams {
    /// Wave amplitude (model length units).
    pub amplitude: f64,
    /// Angular frequency (Hz).
    pub angular_frequency: f64,
    /// Phase increment contributed to groups after this one (rad).
    pub phase_change: f64,
    /// Constant offset added to the wave.
    pub dc_offset: f64,
}

/// Output of [`transform`]: one [`SineParams`] per actuator group plus the
/// decoded auxiliary flags, when present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransformedActions {
    /// Per-group sine-wave parameters, cluster groups first.
    pub waves: Vec<SineParams>,
    /// Decoded touch-sensor-ignore flag (`raw < 0.5` means ignore).
    pub ignore_touch_sensors: Option<bool>,
    /// Decoded hysteresis window in seconds, mapped onto `[0, 2]`.
    pub hysteresis_seconds: Option<f64>,
}

/// Scale a raw normalized action vector into per-group sine parameters.
///
/// Channel `j` of group `i` is read from `raw[i * 4 + j]` and mapped linearly
/// onto `[CHANNEL_MIN[j], CHANNEL_MAX[j]]`. When the vector carries two extra
/// trailing entries, they decode the touch-sensor-ignore flag (threshold 0.5)
/// and the hysteresis window (linear onto `[0, 2]` seconds).
///
/// # Errors
///
/// Returns [`ControlError::ActionLengthMismatch`] when `raw` is neither
/// `n_actions * 4` nor `n_actions * 4 + 2` entries long. A wrong-sized vector
/// is a contract violation, never silently padded.
pub fn transform(raw: &[f64], n_actions: usize) -> Result<TransformedActions> {
    let expected = n_actions * N_PARAMS;
    let has_aux = raw.len() == expected + 2;
    if raw.len() != expected && !has_aux {
        return Err(ControlError::action_length_mismatch(raw.len(), expected));
    }

    let mut waves = Vec::with_capacity(n_actions);
    for i in 0..n_actions {
        let mut scaled = [0.0; N_PARAMS];
        for (j, value) in scaled.iter_mut().enumerate() {
            let range = CHANNEL_MAX[j] - CHANNEL_MIN[j];
            *value = raw[i * N_PARAMS + j] * range + CHANNEL_MIN[j];
        }
        waves.push(SineParams {
            amplitude: scaled[0],
            angular_frequency: scaled[1],
            phase_change: scaled[2],
            dc_offset: scaled[3],
        });
    }

    let (ignore_touch_sensors, hysteresis_seconds) = if has_aux {
        let touch = raw[raw.len() - 2];
        let window = raw[raw.len() - 1] * (HYSTERESIS_MAX - HYSTERESIS_MIN) + HYSTERESIS_MIN;
        (Some(touch < 0.5), Some(window))
    } else {
        (None, None)
    };

    Ok(TransformedActions {
        waves,
        ignore_touch_sensors,
        hysteresis_seconds,
    })
}

/// Read a manually-specified parameter vector from a plain-text file.
///
/// Line `line_number` (1-indexed) is split on commas and parsed as `f64`.
/// Missing or malformed fields default to `1.0` with a warning. Every entry
/// is then perturbed by a uniform value in `[-0.005, +0.005)` - controlled
/// noise injection for learning diversity, applied even to values the
/// operator wrote by hand.
///
/// # Errors
///
/// Returns [`ControlError::InvalidConfig`] for a zero line number and
/// [`ControlError::ManualParamsIo`] when the file cannot be read.
pub fn read_manual_params<R: Rng>(
    path: &Path,
    line_number: usize,
    n_params: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if line_number == 0 {
        return Err(ControlError::invalid_config(
            "manual parameter line numbers are 1-indexed",
        ));
    }

    let text = std::fs::read_to_string(path)?;
    let line = text.lines().nth(line_number - 1).unwrap_or_default();

    let mut result = vec![1.0; n_params];
    let mut parsed = 0;
    for (i, cell) in line.split(',').take(n_params).enumerate() {
        match cell.trim().parse::<f64>() {
            Ok(value) => result[i] = value,
            Err(_) => {
                warn!(field = i, cell, "malformed manual parameter, defaulting to 1.0");
            }
        }
        parsed = i + 1;
    }
    if parsed < n_params {
        warn!(
            parsed,
            expected = n_params,
            "manual parameter line is short, padding with 1.0"
        );
    }

    for value in &mut result {
        *value += rng.gen::<f64>() * 2.0 * MANUAL_PERTURBATION - MANUAL_PERTURBATION;
    }

    Ok(result)
}
