use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

// ── Local store ──
//
// Keys mirror what the web client kept in localStorage.

pub const ADMIN_TOKEN: &str = "adminToken";
pub const ADMIN_SESSION_DATA: &str = "adminSessionData";
pub const USER: &str = "user";
pub const REMEMBERED_SESSION: &str = "rememberedSession";
pub const ADMIN_LOGOUT_AT: &str = "adminLogoutAt";

pub fn catalog_key(kind: &str) -> String {
    format!("catalog:{kind}")
}

pub fn get_value(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM local_store WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_value(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO local_store (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

pub fn remove_values(conn: &Connection, keys: &[&str]) -> anyhow::Result<usize> {
    let mut removed = 0;
    for key in keys {
        removed += conn.execute("DELETE FROM local_store WHERE key = ?1", params![key])?;
    }
    Ok(removed)
}

/// Reads a JSON value. A value that no longer parses is treated as absent.
pub fn get_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> anyhow::Result<Option<T>> {
    let Some(raw) = get_value(conn, key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable stored value");
            Ok(None)
        }
    }
}

pub fn set_json<T: Serialize>(conn: &Connection, key: &str, value: &T) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value)?;
    set_value(conn, key, &raw)
}
