//! Failure taxonomy shared by the stores, the policies and the HTTP layer

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Every operation either succeeds or reports exactly one of these
#[derive(Debug, Error)]
pub enum TriviaError {
    /// A required input was absent or malformed
    #[error("Invalid request")]
    InvalidRequest,

    /// The requested resource does not exist or the result set is empty
    #[error("Request not found")]
    NotFound,

    /// The store rejected a write
    #[error("Something went wrong: {0}")]
    Processing(String),

    /// Anything the core cannot classify
    #[error("Server error: {0}")]
    Internal(String),
}

pub type TriviaResult<T> = Result<T, TriviaError>;

impl TriviaError {
    /// Wrap a failed write; the cause stays in the logs, not in the response
    pub fn processing(err: impl std::fmt::Display) -> Self {
        TriviaError::Processing(err.to_string())
    }

    /// Message returned to clients in the error envelope
    pub fn public_message(&self) -> &'static str {
        match self {
            TriviaError::InvalidRequest => "Invalid request",
            TriviaError::NotFound => "Request not found",
            TriviaError::Processing(_) => "Something went wrong",
            TriviaError::Internal(_) => "Server error",
        }
    }
}

impl From<rusqlite::Error> for TriviaError {
    fn from(err: rusqlite::Error) -> Self {
        TriviaError::Internal(err.to_string())
    }
}

impl From<r2d2::Error> for TriviaError {
    fn from(err: r2d2::Error) -> Self {
        TriviaError::Internal(format!("connection pool: {}", err))
    }
}

impl From<actix_web::error::BlockingError> for TriviaError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        TriviaError::Internal(err.to_string())
    }
}

/// `{success: false, error, message}`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: u16,
    pub message: &'static str,
}

impl ResponseError for TriviaError {
    fn status_code(&self) -> StatusCode {
        match self {
            TriviaError::InvalidRequest => StatusCode::BAD_REQUEST,
            TriviaError::NotFound => StatusCode::NOT_FOUND,
            TriviaError::Processing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TriviaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            TriviaError::Processing(cause) => log::warn!("Write rejected by store: {}", cause),
            TriviaError::Internal(cause) => log::error!("Internal failure: {}", cause),
            _ => {}
        }

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message: self.public_message(),
        })
    }
}
