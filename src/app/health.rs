use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};

use super::{not_found::not_found, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner).fallback(not_found))
        .route("/health_check", get(health_check).fallback(not_found))
}

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn banner() -> &'static str {
    "Newsletter backend is running."
}
