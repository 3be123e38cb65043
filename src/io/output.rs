//! Logging setup

use std::fs::File;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{layer, time::Uptime};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

/// DEBUG when verbose, so step-size adjustments show up
fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Route log output to `output_path`, or to stdout when none is given.
///
/// Timestamps are elapsed time since the subscriber was installed. A log
/// file that cannot be created falls back to stdout.
pub fn setup_output(output_path: Option<&String>, verbose: bool) {
    let filter = level_filter(verbose);

    if let Some(path) = output_path {
        match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(Uptime::default())
                    .with_ansi(false);
                Registry::default().with(file_layer).with(filter).init();
                info!("Output will be written to: {}", path);
                return;
            }
            Err(err) => eprintln!("Could not create output file {}: {}", path, err),
        }
    }

    let stdout_layer = layer()
        .with_writer(std::io::stdout)
        .with_timer(Uptime::default())
        .with_ansi(true);
    Registry::default().with(stdout_layer).with(filter).init();
    info!("Output will be printed to stdout");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_debug() {
        assert_eq!(level_filter(true), LevelFilter::DEBUG);
        assert_eq!(level_filter(false), LevelFilter::INFO);
    }
}
