//! Portal store lifecycle.
//!
//! The schema is brought up to date once per process with [`open_database`]
//! (or [`migrate`] on an existing handle). Request handlers then use
//! [`connect`], which only opens the file and applies connection pragmas.

use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use super::DatabaseError;

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/001_initial.sql"),
)];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(v, _)| *v).unwrap_or(0)
}

/// Open a connection without touching the schema.
pub fn connect(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

/// Open a connection and apply any pending migrations.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = connect(path)?;
    migrate(&conn)?;
    Ok(conn)
}

fn apply_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(())
}

/// Bring the schema up to date and return the resulting version.
///
/// Runs under `BEGIN IMMEDIATE`, so concurrent callers on a fresh file
/// serialize on the write lock and the loser sees the winner's version.
pub fn migrate(conn: &Connection) -> Result<i64, DatabaseError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let mut version = schema_version(&tx)?;

    for (target, sql) in MIGRATIONS {
        if *target <= version {
            continue;
        }
        tracing::info!(from = version, to = target, "Migrating portal store");
        tx.execute_batch(sql)
            .map_err(|e| DatabaseError::MigrationFailed {
                version: *target,
                reason: e.to_string(),
            })?;
        version = *target;
    }

    tx.commit()?;
    Ok(version)
}

/// Applied schema version, 0 for an empty file.
pub fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let has_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master
                       WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(0);
    }
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migrated in-memory store for repository tests.
#[cfg(test)]
pub(crate) fn scratch_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    apply_pragmas(&conn)?;
    migrate(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn scratch_store_has_portal_tables() {
        let conn = scratch_database().unwrap();
        assert_eq!(
            table_names(&conn),
            vec![
                "customer_medications",
                "customer_reports",
                "customers",
                "schema_version"
            ]
        );
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn connect_leaves_schema_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("portal.db");
        let conn = connect(&path).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
        assert!(table_names(&conn).is_empty());

        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn migrate_twice_is_a_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("portal.db");
        drop(open_database(&path).unwrap());

        let conn = connect(&path).unwrap();
        assert_eq!(migrate(&conn).unwrap(), latest_version());
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn concurrent_first_migrations_agree() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("portal.db");

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| open_database(&path).map(|_| ())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in results {
            assert!(result.is_ok(), "migration failed: {result:?}");
        }
        let conn = connect(&path).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }
}
