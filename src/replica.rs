// file: `src/replica.rs`
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::io::NullTrajectory;
use crate::metropolis::MetropolisSampler;
use rayon::prelude::*;
use tracing::info;

/// Outcome of one independent replica
#[derive(Debug, Clone)]
pub struct ReplicaSummary {
    pub index: usize,
    /// Seed the replica ran with, `None` for an entropy-seeded run
    pub seed: Option<u64>,
    pub mean_energy: f64,
    pub final_energy: f64,
    pub acceptance_ratio: f64,
    pub final_max_displacement: f64,
    pub energy_drift: f64,
}

/// Run `n_replicas` independent simulations of `config` in parallel.
///
/// Replica `k` is seeded with `seed + k` when the config carries a seed.
/// Replicas share nothing and write no trajectory.
pub fn run_replicas(config: &SimulationConfig, n_replicas: usize) -> Result<Vec<ReplicaSummary>> {
    config.validate()?;
    let schedule = config.schedule();

    (0..n_replicas)
        .into_par_iter()
        .map(|index| {
            let mut replica_config = config.clone();
            replica_config.seed = config.seed.map(|s| s.wrapping_add(index as u64));

            let sampler = MetropolisSampler::from_config(&replica_config)?;
            let result = sampler.run(config.n_steps, &schedule, &mut NullTrajectory)?;

            let summary = ReplicaSummary {
                index,
                seed: replica_config.seed,
                mean_energy: result.stats.mean_energy(),
                final_energy: result.energies().last().copied().unwrap_or_default(),
                acceptance_ratio: result.stats.acceptance_ratio(),
                final_max_displacement: result.final_max_displacement,
                energy_drift: result.energy_drift,
            };
            info!(
                "Replica {}: mean energy {:.6}, acceptance {:.4}",
                index, summary.mean_energy, summary.acceptance_ratio
            );
            Ok(summary)
        })
        .collect()
}

/// Mean and standard error of the replica mean energies
pub fn replica_mean_energy(summaries: &[ReplicaSummary]) -> (f64, f64) {
    let n = summaries.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = summaries.iter().map(|s| s.mean_energy).sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let variance = summaries
        .iter()
        .map(|s| (s.mean_energy - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    (mean, (variance / n as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitialLattice;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            n_particles: 27,
            reduced_density: 0.8,
            n_steps: 300,
            freq_ener: 100,
            freq_traj: 300,
            cutoff: 1.5,
            tuning_interval: 50,
            seed: Some(100),
            lattice: InitialLattice::Cubic,
            traj_file: None,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_replicas_are_indexed_and_seeded() {
        let summaries = run_replicas(&small_config(), 3).unwrap();
        assert_eq!(summaries.len(), 3);
        for (k, s) in summaries.iter().enumerate() {
            assert_eq!(s.index, k);
            assert_eq!(s.seed, Some(100 + k as u64));
            assert!(s.mean_energy.is_finite());
            assert!(s.acceptance_ratio >= 0.0 && s.acceptance_ratio <= 1.0);
        }
    }

    #[test]
    fn test_replica_matches_single_run_with_same_seed() {
        let config = small_config();
        let summaries = run_replicas(&config, 2).unwrap();

        let mut second = config.clone();
        second.seed = Some(101);
        let result = MetropolisSampler::from_config(&second)
            .unwrap()
            .run(second.n_steps, &second.schedule(), &mut NullTrajectory)
            .unwrap();
        assert_eq!(summaries[1].mean_energy, result.stats.mean_energy());
        assert_eq!(summaries[1].acceptance_ratio, result.stats.acceptance_ratio());
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let mut config = small_config();
        config.cutoff = 10.0;
        assert!(run_replicas(&config, 2).is_err());
    }

    #[test]
    fn test_replica_mean_energy() {
        let make = |e: f64| ReplicaSummary {
            index: 0,
            seed: None,
            mean_energy: e,
            final_energy: e,
            acceptance_ratio: 0.4,
            final_max_displacement: 0.1,
            energy_drift: 0.0,
        };
        assert_eq!(replica_mean_energy(&[]), (0.0, 0.0));
        assert_eq!(replica_mean_energy(&[make(-2.0)]), (-2.0, 0.0));
        let (mean, err) = replica_mean_energy(&[make(-1.0), make(-3.0)]);
        assert_eq!(mean, -2.0);
        assert!((err - 1.0).abs() < 1e-12);
    }
}
