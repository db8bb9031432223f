//! Authentication: password hashing, credential verification, token issuance.

pub mod handlers;
pub mod password;
pub mod service;

pub use handlers::router;
pub use service::{AuthError, AuthOutcome};
