use crate::services::articles::ArticleError;
use crate::services::resolver::SlugError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<ArticleError>() {
            return match err {
                ArticleError::NotFound(_) => StatusCode::NOT_FOUND,
                ArticleError::InvalidSlug { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ArticleError::SlugTaken(_) => StatusCode::CONFLICT,
            };
        }
        match self.0.downcast_ref::<SlugError>() {
            Some(SlugError::Exhausted { .. }) => StatusCode::CONFLICT,
            Some(SlugError::EmptyIdentifier) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Application error: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
