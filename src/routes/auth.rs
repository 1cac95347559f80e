use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use chrono::Utc;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::LoginData;
use crate::types::response;
use crate::types::user::Caller;

#[instrument(skip_all, fields(username))]
pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginData>, JsonRejection>,
) -> Result<Json<response::Login>, Error> {
    let Json(user_data) = payload?;

    tracing::Span::current().record("username", user_data.username.as_str());

    user_data.validate()?;

    let principal = match state
        .user_controller
        .verify_credentials(&user_data.username, &user_data.password)
    {
        Ok(principal) => principal,
        Err(e) => {
            tracing::warn!("login failed: {}", e);
            return Err(e);
        }
    };

    let token = state.user_controller.issue_token(&principal.username)?;

    tracing::info!("login succeeded");

    Ok(Json(response::Login::new(&principal, token)))
}

#[instrument(skip_all)]
pub(crate) async fn me(Extension(caller): Extension<Caller>) -> Result<Json<response::User>, Error> {
    let principal = caller.principal().ok_or(Error::NoCredentials)?;

    Ok(Json(response::User::from(principal)))
}

/// Tokens are stateless, so there is nothing to revoke server-side.
pub(crate) async fn logout() -> Json<&'static str> {
    Json("Logged out successfully")
}

pub(crate) async fn test() -> Json<response::Status> {
    tracing::info!("auth test endpoint called");

    Json(response::Status {
        message: "Auth controller is working",
        status: "success",
        timestamp: Utc::now().timestamp_millis(),
    })
}
