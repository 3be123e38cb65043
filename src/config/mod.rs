//! Configuration management for Monte Carlo runs
//!
//! A run is described by a `SimulationConfig`, read from YAML and then
//! overridden field by field from the command line.

mod args;

pub use args::{parse_param, Args};

use crate::energy::{ModelKind, ModelParams, ParamValue};
use crate::error::{McError, Result};
use crate::metropolis::OutputSchedule;
use crate::system::box_length_for;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How particles are placed before the first move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InitialLattice {
    /// Uniform random positions in the box
    Random,
    /// Simple cubic lattice filling the box
    Cubic,
}

/// Parameters of a canonical Monte Carlo simulation
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulationConfig {
    #[serde(default = "default_n_particles")]
    pub n_particles: usize,
    #[serde(default = "default_reduced_density")]
    pub reduced_density: f64,
    #[serde(default = "default_reduced_temperature")]
    pub reduced_temperature: f64,
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
    /// Energy output interval in steps
    #[serde(default = "default_freq_ener")]
    pub freq_ener: usize,
    /// Trajectory output interval in steps
    #[serde(default = "default_freq_traj")]
    pub freq_traj: usize,
    /// Initial maximum displacement per coordinate
    #[serde(default = "default_max_d")]
    pub max_d: f64,
    /// Energy model token: LJ, Buckingham or UnitlessLJ
    #[serde(default = "default_energy")]
    pub energy: String,
    /// Named model parameters, e.g. epsilon/sigma for LJ
    #[serde(default)]
    pub parameters: ModelParams,
    /// Spherical cutoff radius, must stay below half the box length
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
    /// Trials between step-size adjustments
    #[serde(default = "default_tuning_interval")]
    pub tuning_interval: usize,
    /// Random seed (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_lattice")]
    pub lattice: InitialLattice,
    /// Independent replicas run in parallel
    #[serde(default = "default_replicas")]
    pub replicas: usize,
    #[serde(default = "default_traj_file")]
    pub traj_file: Option<String>,
    #[serde(default)]
    pub energy_file: Option<String>,
}

fn default_n_particles() -> usize {
    500
}
fn default_reduced_density() -> f64 {
    0.9
}
fn default_reduced_temperature() -> f64 {
    0.9
}
fn default_n_steps() -> usize {
    1_000_000
}
fn default_freq_ener() -> usize {
    1000
}
fn default_freq_traj() -> usize {
    100_000
}
fn default_max_d() -> f64 {
    0.1
}
fn default_energy() -> String {
    ModelKind::UnitlessLennardJones.token().to_string()
}
fn default_cutoff() -> f64 {
    3.0
}
fn default_tuning_interval() -> usize {
    1000
}
fn default_lattice() -> InitialLattice {
    InitialLattice::Random
}
fn default_replicas() -> usize {
    1
}
fn default_traj_file() -> Option<String> {
    Some("traj_output".to_string())
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_particles: default_n_particles(),
            reduced_density: default_reduced_density(),
            reduced_temperature: default_reduced_temperature(),
            n_steps: default_n_steps(),
            freq_ener: default_freq_ener(),
            freq_traj: default_freq_traj(),
            max_d: default_max_d(),
            energy: default_energy(),
            parameters: ModelParams::new(),
            cutoff: default_cutoff(),
            tuning_interval: default_tuning_interval(),
            seed: None,
            lattice: default_lattice(),
            replicas: default_replicas(),
            traj_file: default_traj_file(),
            energy_file: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_yml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// File (or defaults), then command-line overrides, then validation
    pub fn resolve(args: &Args) -> Result<Self> {
        let base = match &args.config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Apply every command-line value that was given
    pub fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(n) = args.n_particles {
            self.n_particles = n;
        }
        if let Some(rho) = args.reduced_density {
            self.reduced_density = rho;
        }
        if let Some(t) = args.reduced_temperature {
            self.reduced_temperature = t;
        }
        if let Some(n) = args.n_steps {
            self.n_steps = n;
        }
        if let Some(f) = args.freq_ener {
            self.freq_ener = f;
        }
        if let Some(f) = args.freq_traj {
            self.freq_traj = f;
        }
        if let Some(d) = args.max_d {
            self.max_d = d;
        }
        if let Some(ref name) = args.energy {
            self.energy = name.clone();
        }
        if let Some(rc) = args.cutoff {
            self.cutoff = rc;
        }
        for (key, value) in &args.params {
            self.parameters
                .insert(key.clone(), ParamValue::Text(value.clone()));
        }
        if let Some(k) = args.tuning_interval {
            self.tuning_interval = k;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if let Some(lattice) = args.lattice {
            self.lattice = lattice;
        }
        if let Some(r) = args.replicas {
            self.replicas = r;
        }
        if let Some(ref path) = args.traj_file {
            self.traj_file = Some(path.clone());
        }
        if args.no_trajectory {
            self.traj_file = None;
        }
        if let Some(ref path) = args.energy_file {
            self.energy_file = Some(path.clone());
        }
        self
    }

    /// Box side implied by the particle count and density
    pub fn box_length(&self) -> f64 {
        box_length_for(self.n_particles, self.reduced_density)
    }

    pub fn schedule(&self) -> OutputSchedule {
        OutputSchedule {
            freq_ener: self.freq_ener,
            freq_traj: self.freq_traj,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: &str) -> Result<()> {
            Err(McError::InvalidConfig(msg.to_string()))
        }
        fn positive(x: f64) -> bool {
            x > 0.0 && x.is_finite()
        }

        if self.n_particles == 0 {
            return invalid("Particle count must be positive");
        }
        if !positive(self.reduced_density) {
            return invalid("Reduced density must be positive");
        }
        if !positive(self.reduced_temperature) {
            return invalid("Reduced temperature must be positive");
        }
        if self.n_steps == 0 {
            return invalid("Number of steps must be positive");
        }
        if self.freq_ener == 0 {
            return invalid("Energy output interval must be positive");
        }
        if self.freq_traj == 0 {
            return invalid("Trajectory output interval must be positive");
        }
        if !positive(self.max_d) {
            return invalid("Max displacement must be positive");
        }
        if !positive(self.cutoff) {
            return invalid("Cutoff radius must be positive");
        }
        if self.tuning_interval == 0 {
            return invalid("Tuning interval must be positive");
        }
        if self.replicas == 0 {
            return invalid("Replica count must be positive");
        }

        self.energy.parse::<ModelKind>()?;

        let half_box = 0.5 * self.box_length();
        if self.cutoff >= half_box {
            return Err(McError::InvalidConfig(format!(
                "Cutoff {} must be smaller than half the box length {:.6}",
                self.cutoff, half_box
            )));
        }

        Ok(())
    }
}
