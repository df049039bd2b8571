use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application-level failure taxonomy shared by the gateway, the use-cases
/// and the HTTP layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<Value>,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, details: Option<Value>) -> Self {
        AppError::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Symbolic kind rendered in the `error` field of error responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "BadRequestError",
            AppError::Unauthorized { .. } => "UnauthorizedError",
            AppError::Forbidden { .. } => "ForbiddenError",
            AppError::NotFound { .. } => "NotFoundError",
            AppError::Conflict { .. } => "ConflictError",
            AppError::Internal { .. } => "InternalServerError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::Unauthorized { message }
            | AppError::Forbidden { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Internal { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            AppError::Internal { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Returns the `AppError` carried by `err` unchanged, or wraps anything
    /// else as Internal with the cause as details.
    pub fn classify(err: anyhow::Error, message: &str) -> Self {
        Self::classify_with(err, message, |err| err.to_string())
    }

    pub fn classify_with<F>(err: anyhow::Error, message: &str, describe: F) -> Self
    where
        F: FnOnce(&anyhow::Error) -> String,
    {
        match err.downcast::<AppError>() {
            Ok(app_error) => app_error,
            Err(other) => {
                let description = describe(&other);
                AppError::internal(message, Some(Value::String(description)))
            }
        }
    }
}
