//! Command-line argument parsing for Monte Carlo runs

use super::InitialLattice;
use clap::Parser;

/// Canonical-ensemble Monte Carlo simulation of a Lennard-Jones-type fluid
#[derive(Parser, Debug, Default)]
#[command(name = "mcfluid", author, version, long_about = None)]
pub struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Number of particles in the box
    #[arg(short = 'N', long)]
    pub n_particles: Option<usize>,

    /// Reduced temperature T*
    #[arg(short = 'T', long)]
    pub reduced_temperature: Option<f64>,

    /// Reduced density rho*
    #[arg(short = 'r', long)]
    pub reduced_density: Option<f64>,

    /// Number of Monte Carlo steps
    #[arg(short = 'n', long)]
    pub n_steps: Option<usize>,

    /// Energy output interval
    #[arg(long)]
    pub freq_ener: Option<usize>,

    /// Trajectory output interval
    #[arg(long)]
    pub freq_traj: Option<usize>,

    /// Initial maximum displacement
    #[arg(short = 'm', long)]
    pub max_d: Option<f64>,

    /// Energy model (LJ, Buckingham or UnitlessLJ)
    #[arg(short, long)]
    pub energy: Option<String>,

    /// Cutoff radius
    #[arg(long)]
    pub cutoff: Option<f64>,

    /// Model parameter as name=value, repeatable
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Trials between step-size adjustments
    #[arg(long)]
    pub tuning_interval: Option<usize>,

    /// Random seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial particle placement
    #[arg(long, value_enum)]
    pub lattice: Option<InitialLattice>,

    /// Number of independent replicas to run in parallel
    #[arg(long)]
    pub replicas: Option<usize>,

    /// Trajectory output file
    #[arg(long)]
    pub traj_file: Option<String>,

    /// Disable trajectory output
    #[arg(long)]
    pub no_trajectory: bool,

    /// Energy series output file
    #[arg(long)]
    pub energy_file: Option<String>,

    /// Write the resolved configuration to this YAML file
    #[arg(long)]
    pub write_config: Option<String>,

    /// Log file (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Log step-size adjustments
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a `name=value` pair
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("epsilon=0.5").unwrap(),
            ("epsilon".to_string(), "0.5".to_string())
        );
        assert_eq!(
            parse_param(" rho = abc ").unwrap(),
            ("rho".to_string(), "abc".to_string())
        );
        assert!(parse_param("sigma").is_err());
        assert!(parse_param("=1.0").is_err());
    }

    #[test]
    fn test_no_arguments_leaves_everything_unset() {
        let args = Args::parse_from(["mcfluid"]);
        assert!(args.config_file.is_none());
        assert!(args.n_particles.is_none());
        assert!(args.params.is_empty());
        assert!(!args.no_trajectory);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::parse_from([
            "mcfluid",
            "-N",
            "32",
            "-r",
            "0.5",
            "-m",
            "0.3",
            "-e",
            "Buckingham",
        ]);
        assert_eq!(args.n_particles, Some(32));
        assert_eq!(args.reduced_density, Some(0.5));
        assert_eq!(args.max_d, Some(0.3));
        assert_eq!(args.energy.as_deref(), Some("Buckingham"));
    }
}
