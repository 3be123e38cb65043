//! Monte Carlo simulation command-line interface
//!
//! Configuration comes from an optional YAML file overridden by flags.

use color_eyre::eyre::Result;

mod app;

use app::McApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    McApplication::from_cli()?.run()
}
