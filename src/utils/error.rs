use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(String),
    NotFound(String),
    Forbidden(String),
    Unauthorized(String),
    Conflict(String),
    InvalidState(String),
    AlreadyMatched(String),
    DuplicatePending(String),
    SelfRequest,
    InvalidRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "{} not found", msg),
            AppError::Forbidden(msg) => write!(f, "{}", msg),
            AppError::Unauthorized(msg) => write!(f, "{}", msg),
            AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::InvalidState(msg) => write!(f, "{}", msg),
            AppError::AlreadyMatched(msg) => write!(f, "{}", msg),
            AppError::DuplicatePending(msg) => write!(f, "{}", msg),
            AppError::SelfRequest => write!(f, "Cannot request match with yourself"),
            AppError::InvalidRequest(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyMatched(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicatePending(_) => StatusCode::BAD_REQUEST,
            AppError::SelfRequest => StatusCode::BAD_REQUEST,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Falhas de infraestrutura não vazam detalhes para o cliente
        let message = match self {
            AppError::DatabaseError(msg) => {
                log::error!("💥 Database error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message
        }))
    }
}
