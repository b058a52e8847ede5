use axum::{routing::post, Router};

use crate::app::{not_found::not_found, AppState};

pub mod route;
pub mod schema;

pub fn router() -> Router<AppState> {
    Router::new().route("/send-newsletter", post(route::send_newsletter).fallback(not_found))
}
