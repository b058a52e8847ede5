use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

mod schema;

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

/// A common error type that can be used throughout the API.
///
/// Can be returned in a `Result` from an API handler function.
///
/// Every variant is rendered as the same JSON shape, `{ code, message, details }`.
/// `details` names the offending field for `InvalidField` and is `null` otherwise.
/// `UnexpectedError` never exposes its cause to the caller, it is only logged.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{message}")]
    InvalidField { field: String, message: String },
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::InvalidField { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, details) = match self {
            Self::ValidationError(s) => {
                tracing::warn!("{:?}", s);
                (s, None)
            }
            Self::InvalidField { field, message } => {
                tracing::warn!(%field, "{:?}", message);
                (
                    "Invalid request data".to_owned(),
                    Some(vec![schema::ErrorDetails { field, message }]),
                )
            }
            Self::NotFound => (self.to_string(), None),
            Self::UnexpectedError(e) => {
                tracing::error!("{:?}", e);
                ("Unexpected error".to_owned(), None)
            }
        };

        (
            status,
            Json(schema::Error {
                code: status.as_u16(),
                message,
                details,
            }),
        )
            .into_response()
    }
}
