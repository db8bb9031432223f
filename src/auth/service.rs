//! Core account-creation and login flows.
//!
//! Both operations are single linear sequences over the store: expected
//! "not authenticated" outcomes are normalized to [`AuthOutcome`] variants,
//! while infrastructure failures (store errors, hashing failures) propagate
//! as [`AuthError`] and are never folded into the credential outcome.

use rusqlite::Connection;

use super::password;
use crate::store::{self, NewUser};

/// Outcome of an authentication operation
#[derive(Debug)]
pub enum AuthOutcome {
    /// Credentials accepted; carries the issued token value
    Granted(String),
    /// Unknown email, wrong password, or no password set for the account.
    /// Deliberately a single variant so callers cannot enumerate users.
    InvalidCredentials,
    /// Token issuance produced no usable value
    IssuanceFailed,
}

/// Infrastructure failure during an authentication operation
#[derive(Debug)]
pub enum AuthError {
    Store(rusqlite::Error),
    Hash(bcrypt::BcryptError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Store(e) => write!(f, "store error: {}", e),
            AuthError::Hash(e) => write!(f, "hashing error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        AuthError::Store(e)
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AuthError::Hash(e)
    }
}

/// Create a new account and issue its first access token.
///
/// No duplicate-email pre-check: the store's UNIQUE constraint rejects a
/// duplicate insert and that violation propagates as `AuthError::Store`.
pub fn create_account(
    conn: &Connection,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<AuthOutcome, AuthError> {
    let hash = password::hash_password(password)?;

    let user = store::create_user(
        conn,
        NewUser {
            identifier_token: email,
            email,
            name,
            hashed_password: Some(&hash),
        },
    )?;

    let token = store::issue_token(conn, user.id)?;
    if token.is_empty() {
        return Ok(AuthOutcome::IssuanceFailed);
    }
    Ok(AuthOutcome::Granted(token))
}

/// Verify credentials for an existing account and issue a new access token.
///
/// Unknown email and wrong password collapse into `InvalidCredentials`. A
/// user row with no stored hash (password never set) is guarded explicitly
/// and yields `InvalidCredentials` as well; a present-but-malformed hash is
/// an infrastructure failure.
pub fn login(conn: &Connection, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
    let Some(user) = store::get_user_by_email(conn, email)? else {
        return Ok(AuthOutcome::InvalidCredentials);
    };

    let Some(hashed) = user.hashed_password.as_deref() else {
        tracing::debug!("Login attempt for account without a password: {}", email);
        return Ok(AuthOutcome::InvalidCredentials);
    };

    if !password::verify_password(password, hashed)? {
        return Ok(AuthOutcome::InvalidCredentials);
    }

    let token = store::issue_token(conn, user.id)?;
    if token.is_empty() {
        return Ok(AuthOutcome::IssuanceFailed);
    }
    Ok(AuthOutcome::Granted(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_test_store;

    fn token_of(outcome: AuthOutcome) -> String {
        match outcome {
            AuthOutcome::Granted(token) => token,
            other => panic!("expected Granted, got {:?}", other),
        }
    }

    #[test]
    fn test_create_account_then_login() {
        let conn = open_test_store();

        let first = token_of(create_account(&conn, "a@x.com", "secret", None).unwrap());
        let second = token_of(login(&conn, "a@x.com", "secret").unwrap());

        // A fresh token per authentication, no reuse
        assert_ne!(first, second);
    }

    #[test]
    fn test_create_account_stores_identifier_and_name() {
        let conn = open_test_store();
        create_account(&conn, "a@x.com", "secret", Some("Ada")).unwrap();

        let user = store::get_user_by_email(&conn, "a@x.com").unwrap().unwrap();
        assert_eq!(user.identifier_token, "a@x.com");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        // Plaintext never stored
        assert_ne!(user.hashed_password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_login_unknown_email() {
        let conn = open_test_store();
        let outcome = login(&conn, "nobody@x.com", "secret").unwrap();
        assert!(matches!(outcome, AuthOutcome::InvalidCredentials));
    }

    #[test]
    fn test_login_wrong_password() {
        let conn = open_test_store();
        create_account(&conn, "a@x.com", "secret", None).unwrap();

        let outcome = login(&conn, "a@x.com", "wrong").unwrap();
        assert!(matches!(outcome, AuthOutcome::InvalidCredentials));
    }

    #[test]
    fn test_duplicate_email_surfaces_store_error() {
        let conn = open_test_store();
        create_account(&conn, "a@x.com", "secret", None).unwrap();

        let result = create_account(&conn, "a@x.com", "other", None);
        assert!(matches!(result, Err(AuthError::Store(_))));
    }

    #[test]
    fn test_login_without_stored_hash_is_invalid_credentials() {
        let conn = open_test_store();
        store::create_user(
            &conn,
            NewUser {
                identifier_token: "ext@x.com",
                email: "ext@x.com",
                name: None,
                hashed_password: None,
            },
        )
        .unwrap();

        let outcome = login(&conn, "ext@x.com", "anything").unwrap();
        assert!(matches!(outcome, AuthOutcome::InvalidCredentials));
    }

    #[test]
    fn test_login_with_malformed_stored_hash_is_an_error() {
        let conn = open_test_store();
        store::create_user(
            &conn,
            NewUser {
                identifier_token: "bad@x.com",
                email: "bad@x.com",
                name: None,
                hashed_password: Some("garbage"),
            },
        )
        .unwrap();

        let result = login(&conn, "bad@x.com", "anything");
        assert!(matches!(result, Err(AuthError::Hash(_))));
    }

    #[test]
    fn test_no_token_issued_on_failed_login() {
        let conn = open_test_store();
        create_account(&conn, "a@x.com", "secret", None).unwrap();
        let user = store::get_user_by_email(&conn, "a@x.com").unwrap().unwrap();
        let before = store::tokens::count_user_tokens(&conn, user.id).unwrap();

        login(&conn, "a@x.com", "wrong").unwrap();
        login(&conn, "other@x.com", "secret").unwrap();

        let after = store::tokens::count_user_tokens(&conn, user.id).unwrap();
        assert_eq!(before, after);
    }
}
