use api_types::ErrorBody;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use engine::{EngineError, ErrorKind};

pub use auth::{AuthConfig, AuthError, AuthUser, Claims, JwtKeys};
pub use server::{app, run_with_listener};

mod auth;
mod health;
mod items;
mod purchasings;
mod server;
mod suppliers;

/// Message returned when a purchasing unit could not be committed.
const PURCHASING_FAILED: &str = "failed to create purchasing transaction";
const INTERNAL_ERROR: &str = "internal server error";

/// Every failure a handler can produce, translated to HTTP in one place.
#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Auth(AuthError),
    /// Malformed request body.
    Generic(String),
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Transaction(reason) => {
            tracing::error!("purchasing transaction failed: {reason}");
            PURCHASING_FAILED.to_string()
        }
        EngineError::Unloaded {
            purchasing_id,
            reason,
        } => {
            tracing::error!(purchasing_id, "committed purchasing could not be loaded: {reason}");
            format!("purchasing {purchasing_id} was created but could not be loaded")
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            INTERNAL_ERROR.to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_kind(err.kind()), message_for_engine_error(err)),
            ServerError::Auth(AuthError::TokenCreation(reason)) => {
                tracing::error!("token creation failed: {reason}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
            ServerError::Auth(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
