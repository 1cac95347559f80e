use axum::BoxError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("No signing secret configured")]
    MissingSecret,
    #[error("Signing secret must be at least {0} bytes")]
    InvalidSecret(usize),
    #[error("Token lifetime out of range: {0} hours")]
    InvalidLifetime(i64),
    #[error("Rate limit must be at least one request per second")]
    InvalidRateLimit,
    #[error("Invalid user entry: {0}")]
    InvalidUserEntry(String),
    #[error("Duplicate user: {0}")]
    DuplicateUser(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid credentials")]
    BadCredentials,
    #[error("No credentials provided")]
    NoCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Expired token")]
    ExpiredToken,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),
    #[error("Not found")]
    NotFound,
    #[error("Token expiry out of range")]
    ExpiryOverflow,
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl Error {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Error::BadCredentials
            | Error::NoCredentials
            | Error::InvalidToken
            | Error::ExpiredToken => StatusCode::UNAUTHORIZED,
            Error::MissingField(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Jwt(_) | Error::Bcrypt(_) | Error::ExpiryOverflow => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!("{:?}", self);
            "Internal server error".to_owned()
        } else {
            tracing::debug!("{:?}", self);
            self.to_string()
        };

        (
            status,
            Json(json!({
                "message": message,
                "status": "error",
            })),
        )
            .into_response()
    }
}

pub(crate) async fn handle_middleware_errors(err: BoxError) -> (StatusCode, &'static str) {
    tracing::error!("Unhandled error: {:?}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
