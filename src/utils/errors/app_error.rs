use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::error_payload::ErrorPayload;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User not found")]
    UserNotFound,

    #[error("Follow not found")]
    FollowNotFound,

    #[error("You are already following this user")]
    FollowAlreadyExists,

    #[error("You cannot follow yourself")]
    FollowingYourself,

    #[error("Followers not found")]
    FollowersNotFound,

    #[error("Following not found")]
    FollowingNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("An error occurred while accessing the database")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    pub fn code(&self) -> StatusCode {
        match self {
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::FollowNotFound => StatusCode::NOT_FOUND,
            AppError::FollowAlreadyExists => StatusCode::CONFLICT,
            AppError::FollowingYourself => StatusCode::BAD_REQUEST,
            AppError::FollowersNotFound => StatusCode::NOT_FOUND,
            AppError::FollowingNotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> String {
        match self {
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::FollowNotFound => "FOLLOW_NOT_FOUND",
            AppError::FollowAlreadyExists => "FOLLOW_ALREADY_EXISTS",
            AppError::FollowingYourself => "FOLLOWING_YOURSELF",
            AppError::FollowersNotFound => "FOLLOWERS_NOT_FOUND",
            AppError::FollowingNotFound => "FOLLOWING_NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        }
        .to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code();
        let error_response = ErrorPayload {
            message: self.to_string(),
            code: status.as_u16(),
            r#type: self.error_type(),
        };

        (status, Json(error_response)).into_response()
    }
}
