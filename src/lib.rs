//! Evolution-trained sinusoidal actuation control for simulated tensegrity robots.
//!
//! This crate implements the control side of a closed training loop: an
//! external optimizer proposes a flat vector of normalized parameters, the
//! controller turns it into per-muscle and per-joint time-varying length
//! commands, and at the end of each episode a scalar fitness (displacement
//! and energy spent) flows back to the optimizer.
//!
//! - [`transform`](params::transform) - maps the raw action vector into
//!   per-group sine-wave parameters and auxiliary flags
//! - [`SineWaveBank`] - evaluates per-group sine laws each timestep
//! - [`HysteresisLock`] - touch-sensor-driven locking of prismatic joints,
//!   debounced over a configurable window
//! - [`LearningController`] - episode lifecycle (setup, per-step update,
//!   teardown with fitness reporting)
//!
//! # Architecture
//!
//! ```text
//!   Learning        ┌─────────────────────────────────────┐      Robot
//!   Adapter ───────►│  transform ──► SineWaveBank ──┐     │────► Model
//!   (actions)       │                               ▼     │  (actuators,
//!                   │  touch snapshots ──► HysteresisLock │   touch sensors,
//!   Adapter ◄───────│                 gate                │   COM queries)
//!   (fitness)       └─────────────────────────────────────┘
//! ```
//!
//! # Boundaries
//!
//! The physics engine, robot geometry, impedance control, and the
//! evolutionary-algorithm internals are external collaborators reached
//! through the traits in [`robot`] and [`adapter`]. The controller never
//! models contact dynamics or structural deformation; it consumes sensor
//! snapshots and emits actuator commands.
//!
//! # Example
//!
//! ```ignore
//! use sim_control::{ControllerConfig, EpisodeController, LearningController};
//!
//! let config = ControllerConfig::default();
//! let mut controller = LearningController::new(config, adapter, impedance)?;
//!
//! controller.setup(&mut robot)?;
//! for _ in 0..episode_ticks {
//!     physics.step(dt);
//!     controller.step(&mut robot, dt)?;
//! }
//! let metrics = controller.teardown(&mut robot)?;
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn, clippy::suboptimal_flops)]

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod lock;
pub mod metrics;
pub mod params;
pub mod robot;
pub mod wave;

pub use adapter::LearningAdapter;
pub use config::{ControllerConfig, EvolutionSettings};
pub use controller::{EpisodeController, LearningController};
pub use error::ControlError;
pub use lock::HysteresisLock;
pub use metrics::{DisplacementAxis, EpisodeMetrics};
pub use params::{SineParams, TransformedActions, N_PARAMS};
pub use robot::{
    ActuationHistory, End, ImpedanceController, MuscleActuator, PrismaticJoint, RobotModel,
};
pub use wave::SineWaveBank;

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControlError>;
