use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES_SQL)?;
    Ok(())
}

const CREATE_TABLES_SQL: &str = "
CREATE TABLE IF NOT EXISTS history (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    id            TEXT NOT NULL UNIQUE,
    user_id       TEXT NOT NULL,
    medicine_json TEXT NOT NULL,
    source_type   TEXT NOT NULL,
    search_query  TEXT,
    created_at    TEXT NOT NULL DEFAULT (datetime('now')),
    notes         TEXT
);

CREATE INDEX IF NOT EXISTS idx_history_user ON history(user_id, seq);

CREATE TABLE IF NOT EXISTS users (
    id                 TEXT PRIMARY KEY,
    email              TEXT NOT NULL UNIQUE,
    name               TEXT NOT NULL,
    preferred_language TEXT NOT NULL,
    created_at         TEXT NOT NULL,
    subscription_json  TEXT
);

CREATE TABLE IF NOT EXISTS preferences (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn migrations_run_without_error() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        for table in ["history", "users", "preferences"] {
            assert!(table_exists(&conn, table), "{table}");
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn history_table_declares_notes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_TABLES_SQL).unwrap();
        let declared: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('history') WHERE name = 'notes'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(declared);
    }

    #[test]
    fn notes_column_present() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO history (id, user_id, medicine_json, source_type, notes)
             VALUES ('h1', 'guest', '{}', 'search', 'took with food')",
            [],
        )
        .unwrap();
        let notes: String = conn
            .query_row("SELECT notes FROM history WHERE id = 'h1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(notes, "took with food");
    }
}
