use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::Result;
use color_eyre::eyre::Context;
use tracing::level_filters::LevelFilter;

use crate::cli::Cli;

/// Point the global subscriber at the log file. The terminal owns stdout and
/// stderr while the alternate screen is active, so nothing is logged there.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened for appending.
pub fn init(cli: &Cli, log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(desired_level(cli).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn desired_level(cli: &Cli) -> LevelFilter {
    if cli.quiet {
        return LevelFilter::ERROR;
    }

    match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn verbosity_maps_to_levels() {
        let level = |args: &[&str]| desired_level(&Cli::parse_from(args));
        assert_eq!(level(&["market"]), LevelFilter::INFO);
        assert_eq!(level(&["market", "-v"]), LevelFilter::DEBUG);
        assert_eq!(level(&["market", "-vvv"]), LevelFilter::TRACE);
        assert_eq!(level(&["market", "--quiet"]), LevelFilter::ERROR);
    }
}
