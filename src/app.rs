use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use mcfluid::io::{
    setup_output, write_energy_series, NullTrajectory, TextTrajectoryWriter, TrajectorySink,
};
use mcfluid::replica::replica_mean_energy;
use mcfluid::{run_replicas, Args, MetropolisSampler, SimulationConfig, SimulationResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

pub struct McApplication {
    args: Args,
    config: SimulationConfig,
}

impl McApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = SimulationConfig::resolve(&args).wrap_err_with(|| match &args.config_file {
            Some(path) => format!("Unable to load configuration from {}", path),
            None => "Invalid command-line configuration".to_string(),
        })?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.verbose);
        info!("Configuration:\n{:?}", self.config);

        if let Some(ref path) = self.args.write_config {
            self.config
                .to_file(path)
                .wrap_err_with(|| format!("Unable to write configuration to {}", path))?;
            info!("Resolved configuration written to {}", path);
        }

        if self.config.replicas > 1 {
            self.run_replicas()
        } else {
            self.run_single()
        }
    }

    fn run_single(&self) -> Result<()> {
        let config = &self.config;
        let sampler = MetropolisSampler::from_config(config)
            .wrap_err("Failed to initialize the sampler")?;

        let mut sink: Box<dyn TrajectorySink> = match &config.traj_file {
            Some(path) => {
                info!("Trajectory frames every {} steps to {}", config.freq_traj, path);
                Box::new(
                    TextTrajectoryWriter::create(path)
                        .wrap_err_with(|| format!("Unable to create trajectory file {}", path))?,
                )
            }
            None => Box::new(NullTrajectory),
        };

        let result = sampler
            .run(config.n_steps, &config.schedule(), sink.as_mut())
            .wrap_err("Simulation aborted")?;

        if let Some(ref path) = config.energy_file {
            write_energy_file(path, &result, config.freq_ener)
                .wrap_err_with(|| format!("Unable to write energy series to {}", path))?;
            info!("Energy series written to {}", path);
        }

        report_summary(&result);
        Ok(())
    }

    fn run_replicas(&self) -> Result<()> {
        info!("Running {} independent replicas", self.config.replicas);
        let summaries =
            run_replicas(&self.config, self.config.replicas).wrap_err("Replica run aborted")?;

        for s in &summaries {
            info!(
                "  replica {:>3} seed {:?}: <E>/N = {:.6}, final {:.6}, acceptance {:.4}",
                s.index, s.seed, s.mean_energy, s.final_energy, s.acceptance_ratio
            );
            info!(
                "  replica {:>3} drift {:.3e}, max displacement {:.6}",
                s.index, s.energy_drift, s.final_max_displacement
            );
        }
        let (mean, std_err) = replica_mean_energy(&summaries);
        info!("Replica average <E>/N = {:.6} +/- {:.6}", mean, std_err);
        Ok(())
    }
}

fn write_energy_file(path: &str, result: &SimulationResult, interval: usize) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_energy_series(
        &mut writer,
        result.stats.initial_pair_energy,
        result.stats.tail_correction,
        result.energies(),
        interval,
    )?;
    writer.flush()?;
    Ok(())
}

fn report_summary(result: &SimulationResult) {
    let stats = &result.stats;
    info!("\nRun summary:");
    info!("  Trials: {}", stats.total_trials);
    info!("  Accepted: {}", stats.total_accepted);
    info!("  Acceptance ratio: {:.4}", stats.acceptance_ratio());
    info!("  Step-size adjustments: {}", result.adjustments);
    info!("  Final max displacement: {:.6}", result.final_max_displacement);
    info!("  Mean reduced energy: {:.6}", stats.mean_energy());
    info!(
        "  Final reduced energy: {:.6}",
        result.energies().last().copied().unwrap_or_default()
    );
    info!("  Energy drift: {:.3e}", result.energy_drift);
}
