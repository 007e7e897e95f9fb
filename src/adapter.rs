//! Learning adapter boundary.

use crate::metrics::EpisodeMetrics;

/// Boundary to the external optimization process.
///
/// Two backends exist in the surrounding harness - an evolutionary-algorithm
/// adapter and a neuro-evolution adapter - selected at construction time.
/// The controller is agnostic to which one it holds.
///
/// Both calls are synchronous and blocking; the offline, batch-style
/// training loop tolerates an adapter that never returns.
pub trait LearningAdapter {
    /// Request the next normalized action vector.
    ///
    /// The controller's parameters are stateless, so `observation` is empty
    /// and the vector is requested once per episode at setup.
    fn next_actions(&mut self, dt: f64, observation: &[f64]) -> Vec<f64>;

    /// Report end-of-episode fitness scores.
    fn end_episode(&mut self, metrics: &EpisodeMetrics);
}
