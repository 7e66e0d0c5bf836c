use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertwatchError {
    #[error("Internal server error")]
    InternalError,
    /// A server side failure with a message for the client
    #[error("{0}")]
    OperationFailed(String),
    #[error("Invalid data provided: {0}")]
    BadClientData(String),
    #[error("There was a conflict with the request: {0}")]
    Conflict(String),
    #[error("Unauthorized request: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl actix_web::error::ResponseError for CertwatchError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError | Self::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
