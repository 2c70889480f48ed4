use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use rusqlite::{Connection, params};

use crate::list::Item;

pub mod migrate;

/// Exclusive handle to the `SQLite` store. All reads and writes in the
/// process go through this single connection, so the engine serializes them
/// without any application-level locking.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the `SQLite` database at the given path and apply the
    /// fixed pragma set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database file cannot be opened or any pragma
    /// fails; a half-configured connection is closed before propagating.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        if let Err(err) = configure(&conn) {
            let _ = conn.close();
            return Err(err);
        }
        Ok(Self { conn })
    }

    /// Round-trip liveness check.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be executed.
    pub fn ping(&self) -> Result<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .context("database ping failed")?;
        Ok(())
    }

    /// Read the persisted schema version marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the pragma cannot be read.
    pub fn user_version(&self) -> Result<i64> {
        self.conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .context("failed to read schema version")
    }

    /// Load the list items in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare("SELECT text, checked FROM items ORDER BY position, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Item {
                text: row.get(0)?,
                checked: row.get::<_, i64>(1)? != 0,
            })
        })?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Rewrite the stored list in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement inside the transaction fails.
    pub fn replace_items(&mut self, items: &[Item]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM items", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO items (text, checked, position) VALUES (?1, ?2, ?3)")?;
            for (position, item) in items.iter().enumerate() {
                stmt.execute(params![
                    item.text,
                    i64::from(item.checked),
                    i64::try_from(position).unwrap_or(i64::MAX),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Close the connection, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` reports a failure while closing.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| eyre!("failed to close database: {err}"))
    }

    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA synchronous = NORMAL;
        ",
    )
    .context("failed to configure database pragmas")
}
