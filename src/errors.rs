use crate::validation_error::{ErrorCode, ValidationError};
use axum::{http::StatusCode, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("origin denied")]
    OriginDenied,
    #[error("request too large")]
    RequestTooLarge,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("file too large: {size} bytes exceeds {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("refusing to follow symlink at {0}")]
    SymlinkRefused(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("tool error: {0}")]
    ToolError(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Unauthorized",
            AppError::OriginDenied => "OriginDenied",
            AppError::RequestTooLarge => "RequestTooLarge",
            AppError::InvalidRequest(_) => "InvalidRequest",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::SymlinkRefused(_) => "SymlinkRefused",
            AppError::Validation(e) => e.code().as_str(),
            AppError::ToolError(_) => "ToolError",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::OriginDenied => StatusCode::FORBIDDEN,
            AppError::RequestTooLarge | AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SymlinkRefused(_) => StatusCode::CONFLICT,
            AppError::Validation(e) => match e.code() {
                ErrorCode::InvalidInput | ErrorCode::NotDirectory => StatusCode::BAD_REQUEST,
                ErrorCode::NotExist => StatusCode::NOT_FOUND,
                ErrorCode::OutsideWorkspace | ErrorCode::PathEscape => StatusCode::FORBIDDEN,
            },
            AppError::InvalidRequest(_) | AppError::ToolError(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            AppError::Validation(e) => e.hint(),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            hint: self.hint().map(str::to_string),
        }
    }
}

pub fn into_response(err: AppError) -> (StatusCode, Json<ErrorBody>) {
    (err.status(), Json(err.body()))
}
