pub mod cli;
pub mod db;
pub mod lifecycle;
pub mod list;
pub mod paths;
pub mod tui;

mod logging;

use tracing::info;

pub use cli::Cli;

/// Run the market entrypoint: resolve paths, set up file logging, and hand
/// off to the lifecycle orchestrator.
///
/// # Errors
///
/// Returns an error when path resolution, log setup, or the application
/// lifecycle fails.
pub async fn run(cli: &Cli) -> color_eyre::Result<()> {
    let paths = paths::resolve(cli)?;
    logging::init(cli, &paths.log_path)?;

    info!(
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        db = %paths.db_path.display(),
        log = %paths.log_path.display(),
        "starting market"
    );

    lifecycle::start(&paths).await
}
