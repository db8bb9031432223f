//! Access token rows: opaque bearer credentials owned by a single user.
//!
//! A token row is only ever inserted for a freshly created or successfully
//! authenticated user. There is no expiry, reuse, or revocation path.

use chrono::Utc;
use rusqlite::{Connection, Result, params};

use crate::config;

/// Insert a new access token for the given user, returns the token value
pub fn issue_token(conn: &Connection, user_id: i64) -> Result<String> {
    let token = generate_token_value();
    conn.execute(
        "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, Utc::now().to_rfc3339()],
    )?;
    Ok(token)
}

/// Number of tokens ever issued to a user
pub fn count_user_tokens(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM access_tokens WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

/// Generate a new opaque token value
fn generate_token_value() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..config::TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..62);
            match idx {
                0..=9 => (b'0' + idx) as char,
                10..=35 => (b'a' + idx - 10) as char,
                _ => (b'A' + idx - 36) as char,
            }
        })
        .collect()
}
