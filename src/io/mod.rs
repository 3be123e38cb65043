//! Output collaborators for Monte Carlo runs
//!
//! This module handles logging setup, trajectory frames, and the energy series file.

mod energy_series;
mod output;
mod trajectory;

pub use energy_series::write_energy_series;
pub use output::setup_output;
pub use trajectory::{NullTrajectory, TextTrajectoryWriter, TrajectorySink};
