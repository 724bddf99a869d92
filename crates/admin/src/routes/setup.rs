//! One-time bootstrap route.
//!
//! Creates the first administrator while the account store is empty. The
//! route is only mounted when `BACKOFFICE_ALLOW_BOOTSTRAP` is set; it is
//! a setup hatch for fresh deployments, not an admin-creation API. The
//! same operation is reachable from `cc-cli admin create-initial`.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

use super::AccountResponse;

/// Build the setup router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/setup", post(create_initial_admin))
}

/// Bootstrap request body.
#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: Option<String>,
}

/// Create the first administrator.
///
/// POST /api/auth/setup
///
/// Fails with 409 once any account exists.
async fn create_initial_admin(
    State(state): State<AppState>,
    Json(req): Json<SetupRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    // Boundary check before the authority is involved at all.
    if req.password.len() < state.auth().policy().min_password_length {
        return Err(AppError::BadRequest(format!(
            "password must be at least {} characters",
            state.auth().policy().min_password_length
        )));
    }

    let account = state
        .auth()
        .create_initial_admin(&req.email, &req.password, &req.name, req.surname.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}
