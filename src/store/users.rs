//! User row operations.
//!
//! Rows are created on account creation and never mutated or deleted here.
//! Email uniqueness is enforced solely by the UNIQUE column constraint; a
//! duplicate insert surfaces as a constraint-violation error from SQLite.

use chrono::Utc;
use rusqlite::{Connection, Result, params};

/// A user identity record as stored
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub identifier_token: String,
    pub email: String,
    pub name: Option<String>,
    /// Nullable in the schema; password login requires it to be set
    pub hashed_password: Option<String>,
}

/// Fields for a new user row
pub struct NewUser<'a> {
    pub identifier_token: &'a str,
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub hashed_password: Option<&'a str>,
}

/// Insert a new user, returns the created row
pub fn create_user(conn: &Connection, new_user: NewUser<'_>) -> Result<User> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (identifier_token, email, name, hashed_password, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_user.identifier_token,
            new_user.email,
            new_user.name,
            new_user.hashed_password,
            now
        ],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        identifier_token: new_user.identifier_token.to_string(),
        email: new_user.email.to_string(),
        name: new_user.name.map(str::to_string),
        hashed_password: new_user.hashed_password.map(str::to_string),
    })
}

/// Look up a user by exact email match
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, identifier_token, email, name, hashed_password
         FROM users WHERE email = ?1",
    )?;
    let result = stmt.query_row(params![email], |row| {
        Ok(User {
            id: row.get(0)?,
            identifier_token: row.get(1)?,
            email: row.get(2)?,
            name: row.get(3)?,
            hashed_password: row.get(4)?,
        })
    });
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}
