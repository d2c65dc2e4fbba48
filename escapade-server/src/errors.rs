use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use escapade_admin::{AuthError, DatabaseError, GameError, SessionError};
use log::error;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub type ServerResult<T> = Result<T, ServerError>;

/// The message shown instead of internal details
const INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum ServerError {
    /// Input was rejected, the message says why
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Admin access required")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(detail) => {
                error!("{}", detail);
                INTERNAL_MESSAGE.to_string()
            }
            e => e.to_string(),
        };

        (self.as_status_code(), Json(ErrorBody { error: message })).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Validation(message) => Self::BadRequest(message),
            AuthError::DuplicateUser => Self::BadRequest(AuthError::DuplicateUser.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<GameError> for ServerError {
    fn from(value: GameError) -> Self {
        match value {
            GameError::Validation(message) => Self::BadRequest(message),
            GameError::NotFound => Self::NotFound("Game"),
            GameError::Db(e) => e.into(),
        }
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound { resource, .. } => Self::NotFound(resource),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<SessionError> for ServerError {
    fn from(value: SessionError) -> Self {
        Self::Internal(value.to_string())
    }
}
