//! Canonical-ensemble (NVT) Metropolis Monte Carlo for Lennard-Jones-type fluids
//!
//! Particles live in a cubic periodic box and interact through a pair
//! potential truncated at a spherical cutoff, with an analytic tail
//! correction for the truncated part.

pub mod config;
pub mod energy;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod metropolis;
pub mod pbc;
pub mod replica;
pub mod system;

pub use config::{Args, InitialLattice, SimulationConfig};
pub use energy::{EnergyModel, ModelKind, ModelParams, ParamValue};
pub use error::{McError, Result};
pub use evaluator::EnergyEvaluator;
pub use metropolis::{
    adjust_moves, metropolis_accept, MetropolisSampler, OutputSchedule, RunStatistics,
    SimulationResult, StepSizeController,
};
pub use replica::{run_replicas, ReplicaSummary};
pub use system::SystemState;
