pub mod files;
pub mod protocol;
pub mod questions;
pub mod rest;
pub mod state;

pub use files::upload_file_handler;
pub use questions::ask_question_handler;
pub use rest::{
    evaluate_analogy_handler, evaluate_explanation_handler, health_handler,
    list_analogies_handler, list_explanations_handler,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Builds the API router with its CORS and body-size layers applied.
pub fn router(app_state: Arc<AppState>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(rest::FILE_ID_HEADER)]);
    match app_state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => warn!(
            "CORS_ORIGIN '{}' is not a valid header value; cross-origin requests will be refused",
            app_state.config.cors_origin
        ),
    }

    Router::new()
        .route("/health", get(health_handler))
        .route("/evaluate/explanation", post(evaluate_explanation_handler))
        .route("/evaluate/analogy", post(evaluate_analogy_handler))
        .route("/ask-question", post(ask_question_handler))
        .route("/files", post(upload_file_handler))
        .route("/explanations", get(list_explanations_handler))
        .route("/analogies", get(list_analogies_handler))
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state)
}
