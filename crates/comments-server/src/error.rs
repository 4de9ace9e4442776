use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use comments_shared::api::ErrorResponse;

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Comment not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "ACCESS_TOKEN_INVALID",
            AppError::Forbidden => "ACCESS_FORBIDDEN",
            AppError::NotFound => "COMMENT_NOT_FOUND",
            AppError::BadRequest(_) => "COMMENT_BAD_REQUEST",
            AppError::Store(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: self.code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized, StatusCode::UNAUTHORIZED, "ACCESS_TOKEN_INVALID")]
    #[case(AppError::Forbidden, StatusCode::FORBIDDEN, "ACCESS_FORBIDDEN")]
    #[case(AppError::NotFound, StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND")]
    #[case(AppError::BadRequest("nope".into()), StatusCode::BAD_REQUEST, "COMMENT_BAD_REQUEST")]
    #[case(
        AppError::Internal(anyhow::anyhow!("boom")),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR"
    )]
    fn maps_errors_to_status_and_code(
        #[case] error: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        assert_eq!(error.code(), code);
        assert_eq!(error.into_response().status(), status);
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let error = AppError::BadRequest("author and body are required".into());
        assert_eq!(error.to_string(), "Bad request: author and body are required");
    }
}
