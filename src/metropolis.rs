// file: `src/metropolis.rs`
use crate::config::{InitialLattice, SimulationConfig};
use crate::energy::EnergyModel;
use crate::error::{McError, Result};
use crate::evaluator::EnergyEvaluator;
use crate::io::TrajectorySink;
use crate::pbc::wrap_position;
use crate::system::SystemState;
use nalgebra::Vector3;
use rand::prelude::*;
use rand_distr::Uniform;
use tracing::{debug, info};

/// Acceptance-rate band the step-size controller steers into
pub const TARGET_ACCEPTANCE_LOW: f64 = 0.38;
pub const TARGET_ACCEPTANCE_HIGH: f64 = 0.42;
/// Multipliers applied to the max displacement outside the band
pub const SHRINK_FACTOR: f64 = 0.8;
pub const GROW_FACTOR: f64 = 1.2;

/// Metropolis acceptance probability at inverse temperature `beta`
#[inline]
pub fn acceptance_probability(delta_e: f64, beta: f64) -> f64 {
    if delta_e < 0.0 {
        1.0
    } else {
        (-beta * delta_e).exp()
    }
}

/// Metropolis criterion. Downhill moves are accepted without drawing.
#[inline]
pub fn metropolis_accept<R: Rng + ?Sized>(delta_e: f64, beta: f64, rng: &mut R) -> bool {
    if delta_e < 0.0 {
        return true;
    }
    rng.gen::<f64>() < acceptance_probability(delta_e, beta)
}

/// Rescale `max_d` from the acceptance rate `n_accept / n_trials`.
///
/// Returns the new displacement and both counters reset to zero. The band
/// edges are kept: a rate of exactly 0.38 or 0.42 leaves `max_d` alone.
pub fn adjust_moves(max_d: f64, n_accept: usize, n_trials: usize) -> (f64, usize, usize) {
    if n_trials == 0 {
        return (max_d, 0, 0);
    }
    let acc_rate = n_accept as f64 / n_trials as f64;
    let max_d = if acc_rate < TARGET_ACCEPTANCE_LOW {
        max_d * SHRINK_FACTOR
    } else if acc_rate > TARGET_ACCEPTANCE_HIGH {
        max_d * GROW_FACTOR
    } else {
        max_d
    };
    (max_d, 0, 0)
}

/// Tunes the trial displacement every `interval` trials
///
/// The displacement never exceeds `upper_bound`; the sampler sets it to half
/// the box length, beyond which a wrapped move gains nothing.
#[derive(Debug, Clone)]
pub struct StepSizeController {
    max_displacement: f64,
    upper_bound: f64,
    interval: usize,
    n_trials: usize,
    n_accept: usize,
    adjustments: usize,
}

impl StepSizeController {
    pub fn new(max_displacement: f64, interval: usize) -> Result<Self> {
        if !(max_displacement > 0.0 && max_displacement.is_finite()) {
            return Err(McError::InvalidConfig(format!(
                "Max displacement must be positive, got {}",
                max_displacement
            )));
        }
        if interval == 0 {
            return Err(McError::InvalidConfig(
                "Tuning interval must be positive".to_string(),
            ));
        }
        Ok(Self {
            max_displacement,
            upper_bound: f64::INFINITY,
            interval,
            n_trials: 0,
            n_accept: 0,
            adjustments: 0,
        })
    }

    pub fn max_displacement(&self) -> f64 {
        self.max_displacement
    }

    /// Cap the displacement at `bound`, clamping the current value too
    pub fn with_upper_bound(mut self, bound: f64) -> Self {
        self.upper_bound = bound;
        self.max_displacement = self.max_displacement.min(bound);
        self
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Number of tuning passes so far, whether or not they changed the step
    pub fn adjustments(&self) -> usize {
        self.adjustments
    }

    /// Counters since the last tuning pass: `(n_accept, n_trials)`
    pub fn window(&self) -> (usize, usize) {
        (self.n_accept, self.n_trials)
    }

    /// Count one trial; tunes and returns the (possibly unchanged)
    /// displacement when the interval is complete
    pub fn record(&mut self, accepted: bool) -> Option<f64> {
        self.n_trials += 1;
        if accepted {
            self.n_accept += 1;
        }
        if self.n_trials < self.interval {
            return None;
        }

        let rate = self.n_accept as f64 / self.n_trials as f64;
        let (max_d, n_accept, n_trials) =
            adjust_moves(self.max_displacement, self.n_accept, self.n_trials);
        let max_d = max_d.min(self.upper_bound);
        debug!(
            "Acceptance {:.3} over {} trials, max displacement {:.6} -> {:.6}",
            rate, self.n_trials, self.max_displacement, max_d
        );
        self.max_displacement = max_d;
        self.n_accept = n_accept;
        self.n_trials = n_trials;
        self.adjustments += 1;
        Some(max_d)
    }
}

/// Running energy and counters for one simulation
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// Sum of pair energies, updated by ΔE on each accepted move
    pub total_pair_energy: f64,
    pub initial_pair_energy: f64,
    pub tail_correction: f64,
    pub total_trials: u64,
    pub total_accepted: u64,
    /// Reduced total energy after every step
    pub energies: Vec<f64>,
}

impl RunStatistics {
    fn new(initial_pair_energy: f64, tail_correction: f64) -> Self {
        Self {
            total_pair_energy: initial_pair_energy,
            initial_pair_energy,
            tail_correction,
            total_trials: 0,
            total_accepted: 0,
            energies: Vec::new(),
        }
    }

    /// `(pair energy + tail) / N`
    pub fn reduced_energy(&self, n_particles: usize) -> f64 {
        (self.total_pair_energy + self.tail_correction) / n_particles as f64
    }

    pub fn acceptance_ratio(&self) -> f64 {
        if self.total_trials == 0 {
            0.0
        } else {
            self.total_accepted as f64 / self.total_trials as f64
        }
    }

    pub fn mean_energy(&self) -> f64 {
        if self.energies.is_empty() {
            0.0
        } else {
            self.energies.iter().sum::<f64>() / self.energies.len() as f64
        }
    }
}

/// Which steps emit energies and trajectory frames
#[derive(Debug, Clone, Copy)]
pub struct OutputSchedule {
    pub freq_ener: usize,
    pub freq_traj: usize,
}

impl OutputSchedule {
    #[inline]
    pub fn energy_due(&self, step: usize) -> bool {
        self.freq_ener > 0 && step % self.freq_ener == 0
    }

    #[inline]
    pub fn trajectory_due(&self, step: usize) -> bool {
        self.freq_traj > 0 && step % self.freq_traj == 0
    }
}

/// Everything a finished run hands back
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub state: SystemState,
    pub stats: RunStatistics,
    pub final_max_displacement: f64,
    pub adjustments: usize,
    /// Running pair energy minus a from-scratch recomputation
    pub energy_drift: f64,
}

impl SimulationResult {
    pub fn energies(&self) -> &[f64] {
        &self.stats.energies
    }
}

/// Canonical-ensemble single-particle-move sampler.
///
/// Owns the system state and its random source; the evaluator only ever
/// sees read-only coordinate slices.
#[derive(Debug)]
pub struct MetropolisSampler<R: Rng = StdRng> {
    state: SystemState,
    evaluator: EnergyEvaluator,
    temperature: f64,
    beta: f64,
    controller: StepSizeController,
    stats: RunStatistics,
    rng: R,
    step: usize,
}

impl MetropolisSampler<StdRng> {
    /// Validate `config`, place particles, and build the sampler
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = match config.lattice {
            InitialLattice::Random => {
                SystemState::random(config.n_particles, config.reduced_density, &mut rng)?
            }
            InitialLattice::Cubic => {
                SystemState::cubic_lattice(config.n_particles, config.reduced_density)?
            }
        };
        let model = EnergyModel::from_name(&config.energy, &config.parameters)?;
        info!("Energy model: {}", model);
        let evaluator = EnergyEvaluator::new(model, config.cutoff)?;
        let controller = StepSizeController::new(config.max_d, config.tuning_interval)?;

        Self::new(state, evaluator, config.reduced_temperature, controller, rng)
    }
}

impl<R: Rng> MetropolisSampler<R> {
    /// Compute the initial pair energy and tail correction for `state`
    pub fn new(
        state: SystemState,
        evaluator: EnergyEvaluator,
        temperature: f64,
        controller: StepSizeController,
        rng: R,
    ) -> Result<Self> {
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(McError::InvalidConfig(format!(
                "Reduced temperature must be positive, got {}",
                temperature
            )));
        }
        let box_length = state.box_length();
        if evaluator.cutoff() >= 0.5 * box_length {
            return Err(McError::InvalidConfig(format!(
                "Cutoff {} must be smaller than half the box length {}",
                evaluator.cutoff(),
                0.5 * box_length
            )));
        }

        let initial = evaluator.total_energy(state.coordinates(), box_length);
        if !initial.is_finite() {
            return Err(McError::NonFiniteInitialEnergy(initial));
        }
        let tail = evaluator.tail_correction(state.n_particles(), box_length);
        info!("total pair initial: {}", initial);
        info!("tail correction: {}", tail);

        Ok(Self {
            state,
            evaluator,
            temperature,
            beta: 1.0 / temperature,
            controller: controller.with_upper_bound(0.5 * box_length),
            stats: RunStatistics::new(initial, tail),
            rng,
            step: 0,
        })
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn controller(&self) -> &StepSizeController {
        &self.controller
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Steps completed so far
    pub fn steps_done(&self) -> usize {
        self.step
    }

    pub fn reduced_energy(&self) -> f64 {
        self.stats.reduced_energy(self.state.n_particles())
    }

    /// Propose, evaluate, and accept or reject one single-particle move.
    ///
    /// The running pair energy and the coordinates change together or not
    /// at all. A non-finite particle energy aborts with `NumericFault`
    /// before anything is mutated.
    pub fn trial_move(&mut self) -> Result<bool> {
        let n = self.state.n_particles();
        let box_length = self.state.box_length();
        let index = self.rng.gen_range(0..n);

        let max_d = self.controller.max_displacement();
        let uniform = Uniform::new_inclusive(-max_d, max_d);
        let displacement = Vector3::new(
            self.rng.sample(&uniform),
            self.rng.sample(&uniform),
            self.rng.sample(&uniform),
        );

        let coords = self.state.coordinates();
        let current = self.evaluator.particle_energy(coords, box_length, index);
        let proposed_pos = wrap_position(&(coords[index] + displacement), box_length);
        let proposed = self
            .evaluator
            .particle_energy_at(coords, box_length, index, &proposed_pos);

        for energy in [current, proposed] {
            if !energy.is_finite() {
                return Err(McError::NumericFault {
                    step: self.step,
                    particle: index,
                    energy,
                });
            }
        }

        let delta_e = proposed - current;
        let accepted = metropolis_accept(delta_e, self.beta, &mut self.rng);
        if accepted {
            self.state.set_position(index, proposed_pos);
            self.stats.total_pair_energy += delta_e;
            self.stats.total_accepted += 1;
        }
        self.stats.total_trials += 1;
        self.controller.record(accepted);

        Ok(accepted)
    }

    /// One trial move plus bookkeeping; returns the reduced energy after it
    pub fn step(&mut self) -> Result<f64> {
        self.trial_move()?;
        self.step += 1;
        let energy = self.reduced_energy();
        self.stats.energies.push(energy);
        Ok(energy)
    }

    /// Run `n_steps` moves, logging energies and emitting trajectory frames
    /// on the scheduled steps
    pub fn run_steps<S: TrajectorySink + ?Sized>(
        &mut self,
        n_steps: usize,
        schedule: &OutputSchedule,
        sink: &mut S,
    ) -> Result<()> {
        self.stats.energies.reserve(n_steps);
        for _ in 0..n_steps {
            let energy = self.step()?;
            if schedule.energy_due(self.step) {
                info!("{} {}", self.step, energy);
            }
            if schedule.trajectory_due(self.step) {
                sink.write_frame(self.step, self.state.coordinates())?;
            }
        }
        sink.flush()
    }

    /// Running pair energy minus `total_energy` recomputed from scratch
    pub fn energy_drift(&self) -> f64 {
        let recomputed = self
            .evaluator
            .total_energy(self.state.coordinates(), self.state.box_length());
        self.stats.total_pair_energy - recomputed
    }

    pub fn finish(self) -> SimulationResult {
        let energy_drift = self.energy_drift();
        info!(
            "Finished {} steps: acceptance {:.4}, max displacement {:.6}, energy drift {:.3e}",
            self.step,
            self.stats.acceptance_ratio(),
            self.controller.max_displacement(),
            energy_drift
        );
        SimulationResult {
            final_max_displacement: self.controller.max_displacement(),
            adjustments: self.controller.adjustments(),
            energy_drift,
            state: self.state,
            stats: self.stats,
        }
    }

    /// Run to completion and hand back the result
    pub fn run<S: TrajectorySink + ?Sized>(
        mut self,
        n_steps: usize,
        schedule: &OutputSchedule,
        sink: &mut S,
    ) -> Result<SimulationResult> {
        self.run_steps(n_steps, schedule, sink)?;
        Ok(self.finish())
    }
}
