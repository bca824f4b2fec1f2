//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use ps_core::{Error, Result};
use rusqlite::Connection;

/// V1: initial schema -- users, sessions, images, and comments.
const V1_INITIAL: &str = r#"
-- Accounts and sessions
CREATE TABLE users (
    id            TEXT PRIMARY KEY,
    username      TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE auth_tokens (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token      TEXT UNIQUE NOT NULL,
    expires_at TEXT NOT NULL
);

-- Uploaded images; the bytes live in the row.
-- `username` is the uploader's name as a plain string so images survive
-- account deletion. `uploaded_date` is nullable: rows imported from older
-- instances may not carry one.
CREATE TABLE images (
    id            TEXT PRIMARY KEY,
    data          BLOB NOT NULL,
    mimetype      TEXT NOT NULL,
    username      TEXT NOT NULL,
    uploaded_date TEXT
);

-- Comments attached to an image
CREATE TABLE comments (
    id          TEXT PRIMARY KEY,
    image_id    TEXT NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    username    TEXT NOT NULL,
    comment     TEXT NOT NULL,
    posted_date TEXT NOT NULL
);

-- Indexes
CREATE INDEX idx_images_username   ON images(username);
CREATE INDEX idx_comments_image_id ON comments(image_id);
"#;

/// V2: audit log for destructive and mutating actions.
const V2_ACTION_HISTORY: &str = r#"
CREATE TABLE action_history (
    id          TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    item        TEXT NOT NULL,
    username    TEXT NOT NULL,
    ip_address  TEXT,
    info        TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL
);
CREATE INDEX idx_action_history_item ON action_history(item);
"#;

/// V3: composite index so comment pages read in display order.
const V3_COMMENT_ORDER: &str = r#"
CREATE INDEX idx_comments_posted ON comments(image_id, posted_date);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, V1_INITIAL),
    (2, V2_ACTION_HISTORY),
    (3, V3_COMMENT_ORDER),
];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit()
            .map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // second call is a no-op
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn test_all_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();

        let tables = [
            "users",
            "auth_tokens",
            "images",
            "comments",
            "action_history",
            "schema_migrations",
        ];
        for t in &tables {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                    [t],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "table {t} should exist");
        }
    }

    #[test]
    fn test_uploaded_date_is_nullable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO images (id, data, mimetype, username) VALUES ('abc', x'00', 'image/png', 'u')",
            [],
        )
        .unwrap();

        let date: Option<String> = conn
            .query_row("SELECT uploaded_date FROM images WHERE id = 'abc'", [], |r| r.get(0))
            .unwrap();
        assert!(date.is_none());
    }
}
