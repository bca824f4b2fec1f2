//! Mutation audit log operations.
//!
//! Every destructive or mutating request records what happened, to what,
//! by whom, and from where. Failures to write here must never fail the
//! request that triggered them; callers log and move on.

use chrono::Utc;
use ps_core::{ActionId, Error, Result};
use rusqlite::Connection;

use crate::models::ActionEntry;

const COLS: &str = "id, action_type, item, username, ip_address, info, created_at";

/// Append an entry to the action history.
pub fn record_action(
    conn: &Connection,
    action_type: &str,
    item: &str,
    username: &str,
    ip_address: Option<&str>,
    info: &serde_json::Value,
) -> Result<ActionEntry> {
    let id = ActionId::new();
    let created_at = Utc::now().to_rfc3339();
    let info_json = info.to_string();

    conn.execute(
        "INSERT INTO action_history (id, action_type, item, username, ip_address, info, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id.to_string(),
            action_type,
            item,
            username,
            ip_address,
            &info_json,
            &created_at
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(ActionEntry {
        id,
        action_type: action_type.to_string(),
        item: item.to_string(),
        username: username.to_string(),
        ip_address: ip_address.map(String::from),
        info: info.clone(),
        created_at,
    })
}

/// List history entries touching a given item, newest first.
pub fn list_actions_for_item(conn: &Connection, item: &str) -> Result<Vec<ActionEntry>> {
    let q = format!(
        "SELECT {COLS} FROM action_history WHERE item = ?1 ORDER BY created_at DESC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([item], ActionEntry::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn record_and_list() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let info = serde_json::json!({"request_url": "/images/abc123", "author": "alice"});
        let entry =
            record_action(&conn, "delete_image", "abc123", "alice", Some("127.0.0.1"), &info)
                .unwrap();
        assert_eq!(entry.action_type, "delete_image");

        let list = list_actions_for_item(&conn, "abc123").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].username, "alice");
        assert_eq!(list[0].ip_address.as_deref(), Some("127.0.0.1"));
        assert_eq!(list[0].info["author"], "alice");
    }

    #[test]
    fn missing_ip_is_null() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        record_action(&conn, "upload_image", "xyz", "bob", None, &serde_json::json!({})).unwrap();
        let list = list_actions_for_item(&conn, "xyz").unwrap();
        assert!(list[0].ip_address.is_none());
    }

    #[test]
    fn unrelated_items_not_listed() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        record_action(&conn, "delete_image", "one", "u", None, &serde_json::json!({})).unwrap();
        record_action(&conn, "delete_image", "two", "u", None, &serde_json::json!({})).unwrap();

        assert_eq!(list_actions_for_item(&conn, "one").unwrap().len(), 1);
    }
}
