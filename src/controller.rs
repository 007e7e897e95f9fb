//! Episode lifecycle management.
//!
//! [`LearningController`] drives one episode per setup/step/teardown cycle:
//! it requests an action vector from the learning adapter at setup, turns it
//! into per-group sine laws, applies them every tick (gated by the touch
//! hysteresis lock), and reports displacement and energy back to the adapter
//! at teardown. The external physics driver guarantees the three entry
//! points are never invoked concurrently for one instance.

use nalgebra::Vector3;
use tracing::{debug, info, trace, warn};

use crate::adapter::LearningAdapter;
use crate::config::ControllerConfig;
use crate::error::ControlError;
use crate::lock::HysteresisLock;
use crate::metrics::{self, DisplacementAxis, EpisodeMetrics};
use crate::params;
use crate::robot::{End, ImpedanceController, RobotModel};
use crate::wave::SineWaveBank;
use crate::Result;

/// Timestep used for the one-shot actuator commands issued during setup.
const SETUP_DT: f64 = 1e-4;

/// Prismatic joint order: index 0 is the bottom joint, index 1 the top.
const PRISM_ENDS: [End; 2] = [End::Bottom, End::Top];

/// The three entry points the physics driver calls, in order, once per
/// episode: `setup`, then `step` per tick, then `teardown`.
pub trait EpisodeController {
    /// Prepare the robot and sample this episode's actions.
    fn setup(&mut self, robot: &mut dyn RobotModel) -> Result<()>;

    /// Advance the controller by one physics tick.
    fn step(&mut self, robot: &mut dyn RobotModel, dt: f64) -> Result<()>;

    /// Score the episode, report it to the adapter, and reset.
    fn teardown(&mut self, robot: &mut dyn RobotModel) -> Result<EpisodeMetrics>;
}

/// Evolution-trained sinusoidal controller for one tensegrity robot.
pub struct LearningController {
    config: ControllerConfig,
    adapter: Box<dyn LearningAdapter>,
    impedance: Box<dyn ImpedanceController>,

    /// Muscle indices per cluster, resolved once per episode at setup.
    clusters: Vec<Vec<usize>>,
    /// Per-group sine laws; present only between setup and teardown.
    waves: Option<SineWaveBank>,
    lock: HysteresisLock,
    ignore_touch_sensors: bool,

    total_time: f64,
    recorded_start: bool,
    initial_com: Vector3<f64>,
    /// Set by the surrounding harness to penalize a degenerate episode.
    /// Nothing in the core sets it.
    bad_run: bool,
    episodes_completed: usize,
}

impl LearningController {
    /// Create a controller from a validated configuration and the two
    /// external collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidConfig`] for an invalid configuration.
    pub fn new(
        config: ControllerConfig,
        adapter: Box<dyn LearningAdapter>,
        impedance: Box<dyn ImpedanceController>,
    ) -> Result<Self> {
        config.validate()?;
        let lock = HysteresisLock::new(config.hysteresis_seconds, config.tick_rate_hz);
        let ignore_touch_sensors = config.ignore_touch_sensors;
        Ok(Self {
            config,
            adapter,
            impedance,
            clusters: Vec::new(),
            waves: None,
            lock,
            ignore_touch_sensors,
            total_time: 0.0,
            recorded_start: false,
            initial_com: Vector3::zeros(),
            bad_run: false,
            episodes_completed: 0,
        })
    }

    /// The controller configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Elapsed simulated time in the current episode (s).
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of completed episodes.
    #[must_use]
    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Whether prismatic touch gating is currently disabled.
    #[must_use]
    pub fn ignores_touch_sensors(&self) -> bool {
        self.ignore_touch_sensors
    }

    /// Flag the current episode as degenerate. Teardown then reports the
    /// bad-run sentinel instead of the measured displacement.
    pub fn set_bad_run(&mut self) {
        self.bad_run = true;
    }

    fn populate_clusters(&mut self, robot: &dyn RobotModel) -> Result<()> {
        self.clusters.clear();
        for cluster in 0..self.config.n_clusters {
            let pattern = format!("string cluster{}", cluster + 1);
            let indices = robot.cluster_indices(&pattern);
            if indices.is_empty() {
                return Err(ControlError::missing_actuator(pattern));
            }
            if indices.len() != self.config.muscles_per_cluster {
                warn!(
                    cluster,
                    found = indices.len(),
                    expected = self.config.muscles_per_cluster,
                    "cluster size differs from configuration"
                );
            }
            self.clusters.push(indices);
        }
        Ok(())
    }

    /// Sample this episode's raw action vector: from the adapter, or from
    /// the manual-parameter file when one is configured.
    fn sample_actions(&mut self) -> Result<Vec<f64>> {
        // The adapter is stepped either way so its episode bookkeeping
        // stays aligned with the run.
        let raw = self.adapter.next_actions(SETUP_DT, &[]);
        match &self.config.manual_params {
            Some(path) => {
                info!(path = %path.display(), "using manually specified parameters");
                params::read_manual_params(
                    path,
                    self.episodes_completed + 1,
                    self.config.expected_raw_len() + 2,
                    &mut rand::thread_rng(),
                )
            }
            None => Ok(raw),
        }
    }

    fn set_preferred_muscle_lengths(&mut self, robot: &mut dyn RobotModel, dt: f64) {
        let Some(waves) = self.waves.as_ref() else {
            return;
        };
        let mut phase = 0.0;
        for (cluster, members) in self.clusters.iter().enumerate() {
            for &index in members {
                let target_velocity = waves.target(cluster, self.total_time, phase);
                self.impedance.control(
                    robot.muscle(index),
                    dt,
                    self.config.initial_length,
                    target_velocity,
                );
            }
            phase = waves.advance_phase(cluster, phase);
        }
    }

    fn set_prismatic_lengths(&mut self, robot: &mut dyn RobotModel) {
        let Some(waves) = self.waves.as_ref() else {
            return;
        };
        let n_clusters = self.clusters.len();
        let mut phase = 0.0;
        for (prism, &end) in PRISM_ENDS.iter().take(self.config.n_prisms).enumerate() {
            let group = n_clusters + prism;

            // The lock machinery is consulted only while touch gating is
            // enabled, so counters do not advance under an ignore flag.
            let locked = if self.ignore_touch_sensors {
                false
            } else {
                let this_end = robot.touch_snapshot(end);
                let opposite = robot.touch_snapshot(end.opposite());
                // Gating is on the paused level; the one-shot lock event is
                // only significant during the settle window.
                let _event = self.lock.update(end, &this_end, &opposite);
                self.lock.is_paused(end)
            };

            if !locked {
                let target = waves.target(group, self.total_time, phase);
                robot.prismatic(end).set_preferred_length(target);
            }

            phase = waves.advance_phase(group, phase);
        }
    }

    fn move_motors(&self, robot: &mut dyn RobotModel, dt: f64) {
        for index in 0..robot.muscle_count() {
            robot.muscle(index).move_motors(dt);
        }
        for &end in PRISM_ENDS.iter().take(self.config.n_prisms) {
            robot.prismatic(end).move_motors(dt);
        }
    }

    /// Diagnostic tilt measurement between the two tetrahedra. A hook for
    /// bad-run detection lives in the harness; nothing is flagged here.
    fn observe_tilt(&self, robot: &dyn RobotModel) {
        if self.config.axis != DisplacementAxis::SignedY {
            return;
        }
        let bottom = robot.tetra_com(End::Bottom);
        let top = robot.tetra_com(End::Top);
        let drift = (top.x - bottom.x) + (top.z - bottom.z);
        if drift.abs() > 1.0 {
            trace!(drift, "structure is tilting");
        }
    }

    fn do_setup(&mut self, robot: &mut dyn RobotModel) -> Result<()> {
        debug!(episode = self.episodes_completed + 1, "setting up episode");

        // Command every muscle to the shared initial length.
        for index in 0..robot.muscle_count() {
            robot
                .muscle(index)
                .set_control_input(self.config.initial_length, SETUP_DT);
        }

        // Drive the prismatic joints to their minimum extents.
        for &end in PRISM_ENDS.iter().take(self.config.n_prisms) {
            let prism = robot.prismatic(end);
            let min = prism.min_length();
            prism.set_preferred_length(min);
            prism.move_motors(SETUP_DT);
        }

        self.populate_clusters(robot)?;

        let raw = self.sample_actions()?;
        let transformed = params::transform(&raw, self.config.n_actions())?;

        if let Some(ignore) = transformed.ignore_touch_sensors {
            debug!(ignore, "touch-sensor flag decoded from actions");
            self.ignore_touch_sensors = ignore;
        }
        if let Some(seconds) = transformed.hysteresis_seconds {
            self.lock.set_hysteresis_seconds(seconds);
        }
        self.waves = Some(SineWaveBank::new(transformed.waves));
        Ok(())
    }

    fn do_step(&mut self, robot: &mut dyn RobotModel, dt: f64) -> Result<()> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(ControlError::invalid_timestep(dt));
        }
        if self.waves.is_none() {
            return Err(ControlError::EpisodeNotSetUp);
        }
        self.total_time += dt;

        // Startup settling: normal actuation is suspended. The bottom lock
        // still runs so the joint can be frozen at its actual length the
        // tick it locks.
        if self.total_time < self.config.settle_seconds {
            let bottom = robot.touch_snapshot(End::Bottom);
            let top = robot.touch_snapshot(End::Top);
            if self.lock.update(End::Bottom, &bottom, &top) {
                let prism = robot.prismatic(End::Bottom);
                let actual = prism.actual_length();
                prism.set_preferred_length(actual);
            }
            return Ok(());
        }

        if !self.recorded_start {
            self.initial_com = robot.com();
            self.recorded_start = true;
            debug!(com = ?self.initial_com, "recorded starting center of mass");
        }

        self.observe_tilt(robot);

        self.set_preferred_muscle_lengths(robot, dt);
        self.set_prismatic_lengths(robot);
        self.move_motors(robot, dt);
        Ok(())
    }

    fn do_teardown(&mut self, robot: &mut dyn RobotModel) -> Result<EpisodeMetrics> {
        if self.waves.is_none() {
            return Err(ControlError::EpisodeNotSetUp);
        }

        let displacement = if self.bad_run {
            EpisodeMetrics::BAD_RUN
        } else {
            metrics::displacement(self.config.axis, &self.initial_com, &robot.com())
        };

        let mut energy_spent = 0.0;
        for index in 0..robot.muscle_count() {
            energy_spent += metrics::energy_spent(robot.muscle(index).history());
        }

        let episode_metrics = EpisodeMetrics {
            displacement,
            energy_spent,
        };
        self.adapter.end_episode(&episode_metrics);

        self.waves = None;
        self.total_time = 0.0;
        self.recorded_start = false;
        self.initial_com = Vector3::zeros();
        self.bad_run = false;
        self.lock.reset();
        self.episodes_completed += 1;

        info!(displacement, energy_spent, "episode torn down");
        Ok(episode_metrics)
    }
}

impl EpisodeController for LearningController {
    fn setup(&mut self, robot: &mut dyn RobotModel) -> Result<()> {
        self.do_setup(robot)
    }

    fn step(&mut self, robot: &mut dyn RobotModel, dt: f64) -> Result<()> {
        self.do_step(robot, dt)
    }

    fn teardown(&mut self, robot: &mut dyn RobotModel) -> Result<EpisodeMetrics> {
        self.do_teardown(robot)
    }
}

impl std::fmt::Debug for LearningController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningController")
            .field("config", &self.config)
            .field("clusters", &self.clusters)
            .field("waves", &self.waves)
            .field("total_time", &self.total_time)
            .field("episodes_completed", &self.episodes_completed)
            .finish_non_exhaustive()
    }
}
