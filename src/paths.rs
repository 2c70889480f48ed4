use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use directories::ProjectDirs;

use crate::cli::Cli;

const APP_NAME: &str = "market";
const DB_FILE: &str = "market.sqlite3";
const LOG_FILE: &str = "market.log";

/// Resolved locations for the database and log files.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

/// Resolve the database and log paths from CLI overrides, falling back to the
/// per-application directory inside the OS config dir.
///
/// # Errors
///
/// Returns an error if the platform config directory cannot be determined or
/// a required directory cannot be created.
pub fn resolve(cli: &Cli) -> Result<AppPaths> {
    let (db_path, log_path) = match (&cli.db, &cli.log) {
        (Some(db), Some(log)) => (db.clone(), log.clone()),
        (db, log) => {
            let dir = default_app_dir()?;
            (
                db.clone().unwrap_or_else(|| dir.join(DB_FILE)),
                log.clone().unwrap_or_else(|| dir.join(LOG_FILE)),
            )
        }
    };

    ensure_parent(&db_path)?;
    ensure_parent(&log_path)?;

    Ok(AppPaths { db_path, log_path })
}

fn default_app_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| eyre!("unable to resolve platform directories for {APP_NAME}"))?;
    Ok(dirs.config_dir().to_path_buf())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn overrides_take_precedence_and_parents_are_created() -> Result<()> {
        let temp = TempDir::new()?;
        let db = temp.path().join("nested/list.sqlite3");
        let log = temp.path().join("logs/market.log");
        let cli = Cli::parse_from([
            "market",
            "--db",
            db.to_str().unwrap(),
            "--log",
            log.to_str().unwrap(),
        ]);

        let paths = resolve(&cli)?;
        assert_eq!(paths.db_path, db);
        assert_eq!(paths.log_path, log);
        assert!(db.parent().unwrap().exists());
        assert!(log.parent().unwrap().exists());
        Ok(())
    }

    #[test]
    fn relative_override_without_parent_is_accepted() -> Result<()> {
        let cli = Cli::parse_from(["market", "--db", "list.sqlite3", "--log", "market.log"]);
        let paths = resolve(&cli)?;
        assert_eq!(paths.db_path, PathBuf::from("list.sqlite3"));
        assert_eq!(paths.log_path, PathBuf::from("market.log"));
        Ok(())
    }
}
