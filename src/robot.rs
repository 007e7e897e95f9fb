//! Boundary traits for the robot model, actuators, and impedance control.
//!
//! The physics engine owns the actual bodies, constraints, and contact
//! resolution; the controller only ever sees it through these traits. All
//! methods are synchronous and are called from the single driving thread.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One end of the tensegrity structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum End {
    /// Top tetrahedron.
    Top,
    /// Bottom tetrahedron.
    Bottom,
}

impl End {
    /// The other end.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

impl std::fmt::Display for End {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

/// Recorded tension and rest-length samples for one muscle, appended by the
/// physics side once per committed tick.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuationHistory {
    /// Cable tension per sample (N).
    pub tensions: Vec<f64>,
    /// Commanded rest length per sample (model units).
    pub rest_lengths: Vec<f64>,
}

impl ActuationHistory {
    /// Append one sample.
    pub fn record(&mut self, tension: f64, rest_length: f64) {
        self.tensions.push(tension);
        self.rest_lengths.push(rest_length);
    }

    /// Number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensions.len().min(self.rest_lengths.len())
    }

    /// Whether no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A spring-cable muscle actuator.
pub trait MuscleActuator {
    /// Command a new rest length for this timestep.
    fn set_control_input(&mut self, length: f64, dt: f64);

    /// Commit motor motion for this timestep.
    fn move_motors(&mut self, dt: f64);

    /// Tension/rest-length history accumulated over the episode.
    fn history(&self) -> &ActuationHistory;
}

/// A linear extension/retraction joint at one end of the structure.
pub trait PrismaticJoint {
    /// Set the preferred (target) length.
    fn set_preferred_length(&mut self, length: f64);

    /// Current preferred length.
    fn preferred_length(&self) -> f64;

    /// Current actual length as simulated.
    fn actual_length(&self) -> f64;

    /// Minimum extent of the joint.
    fn min_length(&self) -> f64;

    /// Commit motor motion for this timestep.
    fn move_motors(&mut self, dt: f64);
}

/// The robot model as seen by the controller.
///
/// Muscles are addressed by index so that cluster membership, resolved once
/// at setup via [`RobotModel::cluster_indices`], can be stored without
/// holding borrows across ticks.
pub trait RobotModel {
    /// Total number of muscle actuators.
    fn muscle_count(&self) -> usize;

    /// Mutable access to one muscle actuator.
    fn muscle(&mut self, index: usize) -> &mut dyn MuscleActuator;

    /// Indices of the muscles whose names match `pattern`, in model order.
    fn cluster_indices(&self, pattern: &str) -> Vec<usize>;

    /// The prismatic joint at the given end.
    fn prismatic(&mut self, end: End) -> &mut dyn PrismaticJoint;

    /// Read-only touch snapshot for the given end, one flag per sensor.
    /// Valid only for the timestep that requested it.
    fn touch_snapshot(&self, end: End) -> Vec<bool>;

    /// Center of mass of the whole structure.
    fn com(&self) -> Vector3<f64>;

    /// Center of mass of one tetrahedron.
    fn tetra_com(&self, end: End) -> Vector3<f64>;
}

/// Impedance control boundary.
///
/// Translates a target velocity at a rest length into low-level motor
/// commands, respecting whatever stiffness and damping the implementation
/// carries. The reference stack wires in a stiffness/damping/velocity-limit
/// controller; tests use a recording stub.
pub trait ImpedanceController {
    /// Drive one muscle toward `target_velocity` around `rest_length`.
    fn control(
        &mut self,
        muscle: &mut dyn MuscleActuator,
        dt: f64,
        rest_length: f64,
        target_velocity: f64,
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn end_opposite() {
        assert_eq!(End::Top.opposite(), End::Bottom);
        assert_eq!(End::Bottom.opposite(), End::Top);
        assert_eq!(End::Top.to_string(), "top");
    }

    #[test]
    fn history_len_is_min_of_both_series() {
        let mut history = ActuationHistory::default();
        assert!(history.is_empty());

        history.record(1.0, 5.0);
        history.record(2.0, 4.5);
        assert_eq!(history.len(), 2);

        // A ragged history (physics appended tension only) still reports a
        // consistent sample count.
        history.tensions.push(3.0);
        assert_eq!(history.len(), 2);
    }
}
