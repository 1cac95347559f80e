use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::user::{Caller, Rejection};

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(Rejection::Missing)?;

    let token = header
        .to_str()
        .map_err(|_| Rejection::Malformed)?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(Rejection::Malformed)?;

    if token.is_empty() {
        return Err(Rejection::Malformed);
    }

    Ok(token)
}

/// Resolves the caller for every request without ever rejecting it.
pub(crate) async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = match bearer_token(request.headers()) {
        Ok(token) => match state.user_controller.validate_token(token) {
            Ok(principal) => Caller::Authenticated(principal),
            Err(Error::ExpiredToken) => Caller::Anonymous(Rejection::Expired),
            Err(_) => Caller::Anonymous(Rejection::Invalid),
        },
        Err(rejection) => Caller::Anonymous(rejection),
    };

    match &caller {
        Caller::Authenticated(principal) => {
            tracing::debug!(username = %principal.username, "authenticated request")
        }
        Caller::Anonymous(Rejection::Missing) => {}
        Caller::Anonymous(rejection) => {
            tracing::debug!(?rejection, "bearer token rejected, continuing anonymously")
        }
    }

    request.extensions_mut().insert(caller);

    next.run(request).await
}

/// Route layer for protected routes; needs `authenticate` to have run first.
pub(crate) async fn require_auth(request: Request, next: Next) -> Result<Response, Error> {
    match request.extensions().get::<Caller>() {
        Some(Caller::Authenticated(_)) => Ok(next.run(request).await),
        Some(Caller::Anonymous(rejection)) => Err(Error::from(*rejection)),
        None => Err(Error::NoCredentials),
    }
}
