//! services/api/src/web/questions.rs
//!
//! The tutoring endpoint. A question always gets an answer: when the model is
//! unreachable the wizard receives a canned hint and a warning instead of an
//! error status, so the conversation can continue.

use crate::web::{
    protocol::{body_context, AskRequestBody, AskResponse},
    rest::resolve_context,
    state::AppState,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use feynman_core::{conversation::OFFLINE_REPLY, domain::QuestionRequest};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Attached to the offline reply.
pub const TUTOR_UNAVAILABLE: &str = "OpenAI unavailable";

/// Ask the tutor a follow-up question about a draft.
#[utoipa::path(
    post,
    path = "/ask-question",
    request_body = AskRequestBody,
    responses(
        (status = 200, description = "The tutor's reply", body = AskResponse),
        (status = 400, description = "Missing topic, content or question")
    ),
    params(
        ("x-file-id" = Option<Uuid>, Header, description = "An uploaded file to use as context.")
    )
)]
pub async fn ask_question_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AskRequestBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if body.topic.trim().is_empty()
        || body.content.trim().is_empty()
        || body.question.trim().is_empty()
    {
        return Err((StatusCode::BAD_REQUEST, "Missing fields".to_string()));
    }

    let kind = body.draft_kind();
    let inline = body_context(body.context_name.as_deref(), body.context_data.as_deref());
    let request = QuestionRequest {
        kind,
        topic: body.topic,
        content: body.content,
        question: body.question,
        context: resolve_context(&app_state, &headers, inline).await,
    };

    let response = match app_state.feedback.ask_question(&request).await {
        Ok(reply) => AskResponse {
            reply,
            warning: None,
        },
        Err(e) => {
            error!("Tutor call for {} failed, serving offline reply: {}", kind, e);
            AskResponse {
                reply: OFFLINE_REPLY.to_string(),
                warning: Some(TUTOR_UNAVAILABLE.to_string()),
            }
        }
    };
    Ok(Json(response))
}
