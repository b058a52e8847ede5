use super::error::AppError;

#[tracing::instrument(name = "Not found")]
pub async fn not_found() -> AppError {
    AppError::NotFound
}
