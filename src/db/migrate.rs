use color_eyre::Result;
use color_eyre::eyre::{Context, bail};

use super::Database;

/// A single forward schema-change script.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub sql: &'static str,
}

/// Applies an ordered set of migrations exactly once each, tracked through
/// `PRAGMA user_version`.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    migrations: Vec<Migration>,
}

const BUNDLED: &[Migration] = &[
    Migration {
        version: 1,
        sql: r"
        CREATE TABLE items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            checked INTEGER NOT NULL DEFAULT 0
        );
        ",
    },
    Migration {
        version: 2,
        sql: r"
        ALTER TABLE items ADD COLUMN position INTEGER NOT NULL DEFAULT 0;
        CREATE INDEX idx_items_position ON items(position);
        ",
    },
];

impl MigrationRunner {
    /// The real schema history shipped with the application.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            migrations: BUNDLED.to_vec(),
        }
    }

    /// Build a runner from an explicit script list.
    ///
    /// # Errors
    ///
    /// Returns an error unless versions are positive and strictly ascending.
    pub fn new(migrations: Vec<Migration>) -> Result<Self> {
        let mut previous = 0;
        for migration in &migrations {
            if migration.version <= previous {
                bail!(
                    "migration versions must be positive and strictly ascending, got {} after {}",
                    migration.version,
                    previous
                );
            }
            previous = migration.version;
        }
        Ok(Self { migrations })
    }

    /// Highest version among the held scripts, or 0 when empty.
    #[must_use]
    pub fn latest_version(&self) -> i64 {
        self.migrations.last().map_or(0, |m| m.version)
    }

    /// Apply every not-yet-applied script in ascending order, advancing the
    /// version marker inside the same transaction as each script. Re-running
    /// against a current schema is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a script fails; the version marker then still
    /// records the last successfully applied script.
    pub fn run(&self, db: &mut Database) -> Result<usize> {
        let current = db.user_version()?;
        let mut applied = 0;

        for migration in self.migrations.iter().filter(|m| m.version > current) {
            let tx = db.conn_mut().transaction()?;
            tx.execute_batch(migration.sql)
                .with_context(|| format!("migration {} failed", migration.version))?;
            tx.pragma_update(None, "user_version", migration.version)?;
            tx.commit()
                .with_context(|| format!("failed to commit migration {}", migration.version))?;
            applied += 1;
        }

        Ok(applied)
    }
}
