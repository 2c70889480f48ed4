use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::db::Database;
use crate::db::migrate::MigrationRunner;
use crate::list::{Item, ListState};
use crate::paths::AppPaths;
use crate::tui;

const PING_TIMEOUT: Duration = Duration::from_secs(2);
const MIGRATION_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_ITEMS: &[&str] = &["Buy carrots", "Buy celery", "Buy kohlrabi"];

/// Why a bounded startup operation stopped early. Cancellation is a normal
/// termination path and maps to a clean exit; timeout is fatal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StageFailure {
    #[error("{stage} interrupted by shutdown request")]
    Cancelled { stage: &'static str },
    #[error("{stage} timed out after {limit:?}")]
    Timeout {
        stage: &'static str,
        limit: Duration,
    },
}

/// Run the application: open and migrate storage, then hand control to the
/// interactive loop until quit or signal-driven cancellation. The database
/// handle is closed exactly once on every exit path it survives to.
///
/// # Errors
///
/// Returns an error for any fatal startup stage (open, pragmas, ping,
/// migration), or when the event loop itself fails. Signal-triggered
/// shutdown is not an error.
pub async fn start(paths: &AppPaths) -> Result<()> {
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    match run_stages(paths, &shutdown).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Some(StageFailure::Cancelled { stage }) = err.downcast_ref::<StageFailure>() {
                info!(stage, "shutdown requested during startup");
                return Ok(());
            }
            error!(error = %err, "fatal error");
            Err(err)
        }
    }
}

async fn run_stages(paths: &AppPaths, shutdown: &CancellationToken) -> Result<()> {
    let db = Database::open(&paths.db_path)?;

    let (db, ()) = run_bounded(shutdown, "storage ping", PING_TIMEOUT, db, |db| db.ping()).await?;

    let runner = MigrationRunner::bundled();
    let latest = runner.latest_version();
    let (mut db, applied) = run_bounded(
        shutdown,
        "schema migration",
        MIGRATION_TIMEOUT,
        db,
        move |db| runner.run(db),
    )
    .await?;
    info!(applied, version = latest, "schema ready");

    let items = load_or_seed(&mut db)?;
    let state = ListState::new(items);

    // Storage is closed on the way out even when the UI failed.
    let outcome = match tui::run(shutdown, state).await {
        Ok(final_state) => db
            .replace_items(&final_state.into_items())
            .context("failed to persist the list on shutdown"),
        Err(err) => Err(err.wrap_err("interactive session failed")),
    };
    db.close()?;
    outcome?;

    info!("shutting down");
    Ok(())
}

fn load_or_seed(db: &mut Database) -> Result<Vec<Item>> {
    let items = db.load_items()?;
    if !items.is_empty() {
        return Ok(items);
    }
    let seeded: Vec<Item> = DEFAULT_ITEMS
        .iter()
        .map(|text| Item {
            text: (*text).to_string(),
            checked: false,
        })
        .collect();
    db.replace_items(&seeded)?;
    info!(count = seeded.len(), "seeded default list");
    Ok(seeded)
}

/// Listens for interrupt/termination signals; its only action is to cancel
/// the shared token, so it never races the event loop over list state.
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to install interrupt handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    warn!(error = %err, "failed to install termination handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => info!("interrupt received, shutting down"),
            () = terminate => info!("termination signal received, shutting down"),
        }
        shutdown.cancel();
    });
}

/// Run a blocking storage operation off the async thread, racing it against
/// shutdown and a deadline. The connection travels through the closure and
/// comes back with the result; if the race is lost the orphaned task drops
/// (and thereby closes) the connection when it finishes.
async fn run_bounded<T, F>(
    shutdown: &CancellationToken,
    stage: &'static str,
    limit: Duration,
    db: Database,
    op: F,
) -> Result<(Database, T)>
where
    T: Send + 'static,
    F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        let mut db = db;
        let out = op(&mut db)?;
        Ok::<_, color_eyre::Report>((db, out))
    });

    tokio::select! {
        biased;
        () = shutdown.cancelled() => Err(StageFailure::Cancelled { stage }.into()),
        () = tokio::time::sleep(limit) => Err(StageFailure::Timeout { stage, limit }.into()),
        joined = task => joined.with_context(|| format!("{stage} task panicked"))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;
    use std::time::Instant;
    use tempfile::TempDir;

    fn open_db(temp: &TempDir) -> Result<Database> {
        Database::open(&temp.path().join("market.sqlite3"))
    }

    #[tokio::test]
    async fn bounded_operation_returns_the_handle_and_result() -> Result<()> {
        let temp = TempDir::new()?;
        let db = open_db(&temp)?;
        let shutdown = CancellationToken::new();

        let (db, ()) =
            run_bounded(&shutdown, "storage ping", PING_TIMEOUT, db, |db| db.ping()).await?;
        assert_eq!(db.user_version()?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_preempts_the_timeout() -> Result<()> {
        let temp = TempDir::new()?;
        let db = open_db(&temp)?;
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let started = Instant::now();
        let err = run_bounded(&shutdown, "storage ping", PING_TIMEOUT, db, |db| {
            std::thread::sleep(Duration::from_millis(250));
            db.ping()
        })
        .await
        .expect_err("cancelled stage must fail");

        assert!(started.elapsed() < PING_TIMEOUT);
        assert_eq!(
            err.downcast_ref::<StageFailure>(),
            Some(&StageFailure::Cancelled {
                stage: "storage ping"
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn slow_operation_hits_the_deadline() -> Result<()> {
        let temp = TempDir::new()?;
        let db = open_db(&temp)?;
        let shutdown = CancellationToken::new();
        let limit = Duration::from_millis(25);

        let err = run_bounded(&shutdown, "schema migration", limit, db, |db| {
            std::thread::sleep(Duration::from_millis(500));
            db.ping()
        })
        .await
        .expect_err("slow stage must time out");

        assert_eq!(
            err.downcast_ref::<StageFailure>(),
            Some(&StageFailure::Timeout {
                stage: "schema migration",
                limit
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn operation_errors_propagate_with_the_handle_dropped() -> Result<()> {
        let temp = TempDir::new()?;
        let db = open_db(&temp)?;
        let shutdown = CancellationToken::new();

        let err = run_bounded(&shutdown, "storage ping", PING_TIMEOUT, db, |_| {
            Err::<(), _>(eyre!("boom"))
        })
        .await
        .expect_err("operation error must propagate");
        assert!(err.to_string().contains("boom"));
        Ok(())
    }

    #[test]
    fn seeding_only_happens_on_an_empty_store() -> Result<()> {
        let temp = TempDir::new()?;
        let mut db = open_db(&temp)?;
        MigrationRunner::bundled().run(&mut db)?;

        let seeded = load_or_seed(&mut db)?;
        assert_eq!(seeded.len(), DEFAULT_ITEMS.len());
        assert_eq!(seeded[0].text, "Buy carrots");

        let mut checked = seeded;
        checked[1].checked = true;
        db.replace_items(&checked)?;

        let reloaded = load_or_seed(&mut db)?;
        assert_eq!(reloaded, checked);
        Ok(())
    }
}
