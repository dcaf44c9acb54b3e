//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for evaluation, submission listing and health,
//! and the master definition for the OpenAPI specification.

use crate::web::{
    protocol::{
        body_context, AnalogyEvaluationResponse, AskRequestBody, AskResponse, EvaluateRequestBody,
        ExplanationEvaluationResponse, HealthResponse, SubmissionBody, SubmissionListResponse,
        UploadResponse,
    },
    state::AppState,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use feynman_core::domain::{
    DraftKind, Evaluated, Evaluation, EvaluationRequest, FileContext, Submission,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

/// Attached to fallback evaluations served while the model is unreachable.
pub const EVALUATION_UNAVAILABLE: &str = "OpenAI evaluation unavailable";

pub use feynman_core::attachment::FILE_ID_HEADER;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        evaluate_explanation_handler,
        evaluate_analogy_handler,
        crate::web::questions::ask_question_handler,
        crate::web::files::upload_file_handler,
        list_explanations_handler,
        list_analogies_handler,
    ),
    components(
        schemas(
            EvaluateRequestBody,
            ExplanationEvaluationResponse,
            AnalogyEvaluationResponse,
            AskRequestBody,
            AskResponse,
            UploadResponse,
            SubmissionBody,
            SubmissionListResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "Feynman Tutor API", description = "Evaluation and tutoring endpoints for the Feynman technique wizard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Picks the attachment for a request. A stored upload named by `x-file-id`
/// wins over inline context; an unusable id falls back to the inline context.
pub(crate) async fn resolve_context(
    app_state: &AppState,
    headers: &HeaderMap,
    inline: Option<FileContext>,
) -> Option<FileContext> {
    let Some(raw) = headers.get(FILE_ID_HEADER).and_then(|v| v.to_str().ok()) else {
        return inline;
    };
    let file_id = match Uuid::parse_str(raw.trim()) {
        Ok(id) => id,
        Err(_) => {
            warn!("Ignoring malformed {} header: {}", FILE_ID_HEADER, raw);
            return inline;
        }
    };
    match app_state.files.get(file_id).await {
        Ok(stored) => Some(stored.context),
        Err(e) => {
            warn!("Could not load file {}: {}", file_id, e);
            inline
        }
    }
}

/// Validates, evaluates and records one draft. Provider failures degrade to
/// the fallback evaluation with a warning instead of an error status.
async fn run_evaluation(
    app_state: &AppState,
    kind: DraftKind,
    headers: &HeaderMap,
    body: EvaluateRequestBody,
) -> Result<Evaluated, (StatusCode, String)> {
    if body.topic.trim().is_empty() || body.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Missing topic or content".to_string(),
        ));
    }

    let inline = body_context(body.context_name.as_deref(), body.context_data.as_deref());
    let request = EvaluationRequest {
        kind,
        topic: body.topic,
        content: body.content,
        context: resolve_context(app_state, headers, inline).await,
    };

    let evaluated = match app_state.feedback.evaluate(&request).await {
        Ok(evaluated) => evaluated,
        Err(e) => {
            error!("Evaluation of {} failed, serving fallback: {}", kind, e);
            Evaluated::with_warning(Evaluation::fallback(kind), EVALUATION_UNAVAILABLE)
        }
    };

    let submission = Submission {
        id: Uuid::new_v4(),
        kind,
        topic: request.topic,
        content: request.content,
        created_at: Utc::now(),
        evaluation: Some(evaluated.evaluation.clone()),
    };
    if let Err(e) = app_state.submissions.record(submission).await {
        error!("Failed to record {} submission: {:?}", kind, e);
    }
    info!("Evaluated {} submission", kind);

    Ok(evaluated)
}

async fn list_submissions(
    app_state: &AppState,
    kind: DraftKind,
) -> Result<Json<SubmissionListResponse>, (StatusCode, String)> {
    match app_state.submissions.list(kind).await {
        Ok(submissions) => {
            let data: Vec<SubmissionBody> = submissions.into_iter().map(Into::into).collect();
            Ok(Json(SubmissionListResponse {
                count: data.len(),
                data,
            }))
        }
        Err(e) => {
            error!("Failed to list {} submissions: {:?}", kind, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to list {} submissions", kind),
            ))
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
    })
}

/// Evaluate a simple explanation.
///
/// Returns a score from 1 to 10 with strengths, improvements and suggestions.
/// When the model is unavailable, default feedback is returned with a `warning`.
#[utoipa::path(
    post,
    path = "/evaluate/explanation",
    request_body = EvaluateRequestBody,
    responses(
        (status = 201, description = "Explanation evaluated", body = ExplanationEvaluationResponse),
        (status = 400, description = "Missing topic or content")
    ),
    params(
        ("x-file-id" = Option<Uuid>, Header, description = "An uploaded file to use as context.")
    )
)]
pub async fn evaluate_explanation_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<EvaluateRequestBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let evaluated = run_evaluation(&app_state, DraftKind::Explanation, &headers, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ExplanationEvaluationResponse::from(evaluated)),
    ))
}

/// Evaluate an analogy.
///
/// Returns accuracy, clarity and overall scores from 1 to 10 with strengths
/// and improvements.
#[utoipa::path(
    post,
    path = "/evaluate/analogy",
    request_body = EvaluateRequestBody,
    responses(
        (status = 201, description = "Analogy evaluated", body = AnalogyEvaluationResponse),
        (status = 400, description = "Missing topic or content")
    ),
    params(
        ("x-file-id" = Option<Uuid>, Header, description = "An uploaded file to use as context.")
    )
)]
pub async fn evaluate_analogy_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<EvaluateRequestBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let evaluated = run_evaluation(&app_state, DraftKind::Analogy, &headers, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(AnalogyEvaluationResponse::from(evaluated)),
    ))
}

/// List evaluated explanations, newest first.
#[utoipa::path(
    get,
    path = "/explanations",
    responses((status = 200, description = "Recorded explanations", body = SubmissionListResponse))
)]
pub async fn list_explanations_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_submissions(&app_state, DraftKind::Explanation).await
}

/// List evaluated analogies, newest first.
#[utoipa::path(
    get,
    path = "/analogies",
    responses((status = 200, description = "Recorded analogies", body = SubmissionListResponse))
)]
pub async fn list_analogies_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    list_submissions(&app_state, DraftKind::Analogy).await
}
