//! Episode fitness metrics: displacement and energy spent.

use nalgebra::Vector3;

use crate::robot::ActuationHistory;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis mode for the displacement fitness term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisplacementAxis {
    /// Absolute delta along X.
    AbsoluteX,
    /// Signed delta along Y (vertical climb). The default.
    #[default]
    SignedY,
    /// Absolute delta along Z.
    AbsoluteZ,
    /// Full 3D Euclidean distance.
    Euclidean,
}

/// Fitness scores for one episode, computed once at teardown and consumed
/// exactly once by the learning adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpisodeMetrics {
    /// Displacement along the configured axis, or
    /// [`EpisodeMetrics::BAD_RUN`] when the episode was flagged degenerate.
    pub displacement: f64,
    /// Approximate motor work over the episode. See [`energy_spent`].
    pub energy_spent: f64,
}

impl EpisodeMetrics {
    /// Sentinel displacement reported for a flagged bad run, telling the
    /// optimizer to penalize rather than trust this episode.
    pub const BAD_RUN: f64 = -1.0;

    /// Scores in adapter wire order: `[displacement, energy_spent]`.
    #[must_use]
    pub fn as_scores(&self) -> [f64; 2] {
        [self.displacement, self.energy_spent]
    }
}

/// Displacement between two centers of mass along the given axis mode.
#[must_use]
pub fn displacement(axis: DisplacementAxis, initial: &Vector3<f64>, end: &Vector3<f64>) -> f64 {
    match axis {
        DisplacementAxis::AbsoluteX => (end.x - initial.x).abs(),
        DisplacementAxis::SignedY => end.y - initial.y,
        DisplacementAxis::AbsoluteZ => (end.z - initial.z).abs(),
        DisplacementAxis::Euclidean => (end - initial).norm(),
    }
}

/// Approximate motor work from one muscle's tension/rest-length history.
///
/// Sums `previous_tension * min(0, length_delta)` over consecutive samples:
/// only length *decreases* contribute, an increase counts as zero. The
/// reference implementation notes this does not correctly model tensegrity
/// energy; the convention is preserved exactly because trained policies rely
/// on its fitness semantics.
#[must_use]
pub fn energy_spent(history: &ActuationHistory) -> f64 {
    let mut total = 0.0;
    for j in 1..history.len() {
        let previous_tension = history.tensions[j - 1];
        let delta = history.rest_lengths[j] - history.rest_lengths[j - 1];
        total += previous_tension * delta.min(0.0);
    }
    total
}
