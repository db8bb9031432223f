//! RPC handlers for account creation and login.
//!
//! Both mutations are open (no prior authentication) and share one wire
//! contract: the raw token string on success, JSON `null` when the caller is
//! not authenticated. Infrastructure failures are not folded into the null
//! contract; they surface as 500 responses.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;

use super::service::{self, AuthOutcome};
use crate::store::{self, StoreHandle};

/// Request body shared by both mutations
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
    /// Display name. Only create_account reads it; login accepts it for
    /// schema parity with create_account and ignores it.
    #[serde(default)]
    pub name: Option<String>,
}

/// Build the RPC router over the given store handle
pub fn router(store: StoreHandle) -> Router {
    Router::new()
        .route("/api/create_account", post(create_account))
        .route("/api/login", post(login))
        .with_state(store)
}

/// POST /api/create_account - Create a user and issue its first token
pub async fn create_account(
    State(store): State<StoreHandle>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let conn = match store::try_lock(&store) {
        Ok(conn) => conn,
        Err(e) => return store_failure(e),
    };

    match service::create_account(&conn, &req.email, &req.password, req.name.as_deref()) {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => {
            tracing::error!("create_account failed for {}: {}", req.email, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Account creation failed").into_response()
        }
    }
}

/// POST /api/login - Verify credentials and issue a new token
pub async fn login(
    State(store): State<StoreHandle>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let conn = match store::try_lock(&store) {
        Ok(conn) => conn,
        Err(e) => return store_failure(e),
    };

    match service::login(&conn, &req.email, &req.password) {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => {
            tracing::error!("login failed for {}: {}", req.email, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response()
        }
    }
}

/// Collapse non-granted outcomes to the wire-level null
fn outcome_response(outcome: AuthOutcome) -> Response {
    match outcome {
        AuthOutcome::Granted(token) => Json(Some(token)).into_response(),
        AuthOutcome::InvalidCredentials => Json(None::<String>).into_response(),
        AuthOutcome::IssuanceFailed => {
            tracing::warn!("Token issuance produced no value");
            Json(None::<String>).into_response()
        }
    }
}

fn store_failure(e: store::StoreLockError) -> Response {
    tracing::error!("{}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Store unavailable").into_response()
}
