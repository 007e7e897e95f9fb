//! Sine-wave actuation engine.
//!
//! One [`SineParams`] per actuator group, evaluated every timestep. Phase is
//! threaded across groups in iteration order: a group's target is computed
//! with the accumulated phase of all groups before it, then its own
//! `phase_change` is added to the accumulator. The muscle pass and the
//! prismatic pass each start their own accumulator at zero.

use crate::params::SineParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-episode bank of sine-wave parameters, one entry per actuator group.
///
/// Owned by the lifecycle manager for the duration of an episode and dropped
/// at teardown.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SineWaveBank {
    waves: Vec<SineParams>,
}

impl SineWaveBank {
    /// Create a bank from transformed per-group parameters.
    #[must_use]
    pub fn new(waves: Vec<SineParams>) -> Self {
        Self { waves }
    }

    /// Number of actuator groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Whether the bank is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Parameters of one group.
    #[must_use]
    pub fn params(&self, group: usize) -> &SineParams {
        &self.waves[group]
    }

    /// Evaluate the target for one group at elapsed time `t` with the
    /// threaded phase accumulator value for that group.
    ///
    /// `target = amplitude * sin(angular_frequency * t + phase) + dc_offset`
    #[must_use]
    pub fn target(&self, group: usize, t: f64, phase: f64) -> f64 {
        let w = &self.waves[group];
        w.amplitude * (w.angular_frequency * t + phase).sin() + w.dc_offset
    }

    /// Advance a phase accumulator past one group.
    #[must_use]
    pub fn advance_phase(&self, group: usize, phase: f64) -> f64 {
        phase + self.waves[group].phase_change
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn wave(amplitude: f64, frequency: f64, phase_change: f64, offset: f64) -> SineParams {
        SineParams {
            amplitude,
            angular_frequency: frequency,
            phase_change,
            dc_offset: offset,
        }
    }

    #[test]
    fn target_is_offset_sine() {
        let bank = SineWaveBank::new(vec![wave(2.0, 1.0, 0.0, 3.0)]);

        assert_relative_eq!(bank.target(0, 0.0, 0.0), 3.0);
        assert_relative_eq!(bank.target(0, FRAC_PI_2, 0.0), 5.0);
        assert_relative_eq!(bank.target(0, 0.0, FRAC_PI_2), 5.0);
    }

    #[test]
    fn phase_accumulates_cumulatively() {
        let bank = SineWaveBank::new(vec![
            wave(1.0, 1.0, FRAC_PI_2, 0.0),
            wave(1.0, 1.0, PI, 0.0),
            wave(1.0, 1.0, 0.0, 0.0),
        ]);

        // Group 0 sees phase 0, group 1 sees pi/2, group 2 sees 3*pi/2.
        let mut phase = 0.0;
        let mut seen = Vec::new();
        for g in 0..bank.len() {
            seen.push(phase);
            phase = bank.advance_phase(g, phase);
        }

        assert_relative_eq!(seen[0], 0.0);
        assert_relative_eq!(seen[1], FRAC_PI_2);
        assert_relative_eq!(seen[2], FRAC_PI_2 + PI);
    }

    #[test]
    fn zero_amplitude_pins_target_to_offset() {
        let bank = SineWaveBank::new(vec![wave(0.0, 15.0, 1.0, 7.5)]);
        for step in 0..50 {
            let t = f64::from(step) * 0.01;
            assert_relative_eq!(bank.target(0, t, 2.0), 7.5);
        }
    }
}
