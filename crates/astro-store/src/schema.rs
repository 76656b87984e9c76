use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS runs (
            id                TEXT PRIMARY KEY,
            generated_at      TEXT NOT NULL,
            target_count      INTEGER NOT NULL,
            actual_count      INTEGER NOT NULL,
            tier_distribution TEXT NOT NULL,
            type_distribution TEXT NOT NULL,
            created_at        TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS selected_objects (
            run_id         TEXT NOT NULL REFERENCES runs(id),
            token_id       INTEGER NOT NULL,
            name           TEXT NOT NULL,
            object_type    TEXT NOT NULL,
            category       TEXT NOT NULL,
            catalog_source TEXT NOT NULL,
            badge_tier     TEXT NOT NULL,
            total_score    REAL NOT NULL,
            payload        TEXT NOT NULL,
            PRIMARY KEY (run_id, token_id)
        );

        CREATE INDEX IF NOT EXISTS idx_sel_tier ON selected_objects(run_id, badge_tier);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;
    tracing::debug!(version = SCHEMA_VERSION, "schema initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
        let version: String = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, "1");
    }
}
