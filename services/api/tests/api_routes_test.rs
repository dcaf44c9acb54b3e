//! Evaluation service integration tests

use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use feynman_core::domain::{
    AnalogyEvaluation, DraftKind, Evaluated, Evaluation, EvaluationRequest, ExplanationEvaluation,
    FileContext, QuestionRequest,
};
use feynman_core::ports::{FeedbackService, PortError, PortResult};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use api_lib::adapters::{InMemoryFileStore, InMemorySubmissionLog};

/// A model stand-in that either answers deterministically or is unreachable.
#[derive(Default)]
struct StubFeedback {
    offline: bool,
    contexts: Mutex<Vec<Option<FileContext>>>,
    kinds: Mutex<Vec<DraftKind>>,
}

impl StubFeedback {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl FeedbackService for StubFeedback {
    async fn evaluate(&self, request: &EvaluationRequest) -> PortResult<Evaluated> {
        self.contexts.lock().unwrap().push(request.context.clone());
        if self.offline {
            return Err(PortError::Unavailable("connection refused".into()));
        }
        let evaluation = match request.kind {
            DraftKind::Explanation => Evaluation::Explanation(ExplanationEvaluation {
                score: 9,
                strengths: "Plain words".into(),
                improvements: "Add a picture".into(),
                suggestions: "Compare to water".into(),
            }),
            DraftKind::Analogy => Evaluation::Analogy(AnalogyEvaluation {
                accuracy: 8,
                clarity: 6,
                overall: 7,
                strengths: "Familiar".into(),
                improvements: "Tighter mapping".into(),
            }),
        };
        Ok(Evaluated::new(evaluation))
    }

    async fn ask_question(&self, request: &QuestionRequest) -> PortResult<String> {
        self.kinds.lock().unwrap().push(request.kind);
        self.contexts.lock().unwrap().push(request.context.clone());
        if self.offline {
            return Err(PortError::Unavailable("connection refused".into()));
        }
        Ok(format!("- **{}**: keep it short", request.topic))
    }
}

fn setup_test_app(feedback: Arc<StubFeedback>) -> axum::Router {
    let app_state = Arc::new(AppState {
        config: Arc::new(Config::default()),
        feedback,
        submissions: Arc::new(InMemorySubmissionLog::new()),
        files: Arc::new(InMemoryFileStore::new()),
    });
    router(app_state)
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.expect("request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    (status, body.to_vec())
}

async fn json_response(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    let value: Value = serde_json::from_slice(&body).expect("invalid json");
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn upload(filename: &str, mime: &str, data: &str) -> Request<Body> {
    let boundary = "feynman-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {m}\r\n\r\n{d}\r\n--{b}--\r\n",
        b = boundary,
        f = filename,
        m = mime,
        d = data
    );
    Request::builder()
        .method("POST")
        .uri("/files")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = setup_test_app(Arc::new(StubFeedback::default()));
    let (status, body) = json_response(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_evaluate_explanation_returns_scores_and_records_submission() {
    let app = setup_test_app(Arc::new(StubFeedback::default()));
    let req = post_json(
        "/evaluate/explanation",
        json!({"topic": "Ohm's Law", "content": "Voltage pushes current through resistance."}),
    );
    let (status, body) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"], 9);
    assert_eq!(body["suggestions"], "Compare to water");
    assert!(body.get("warning").is_none());

    let (status, listing) = json_response(&app, get("/explanations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["data"][0]["topic"], "Ohm's Law");
    assert_eq!(listing["data"][0]["kind"], "explanation");
    assert_eq!(listing["data"][0]["evaluation"]["score"], 9);

    let (_, analogies) = json_response(&app, get("/analogies")).await;
    assert_eq!(analogies["count"], 0);
}

#[tokio::test]
async fn test_evaluate_analogy_returns_analogy_shape() {
    let app = setup_test_app(Arc::new(StubFeedback::default()));
    let req = post_json(
        "/evaluate/analogy",
        json!({"topic": "Ohm's Law", "content": "Like water through a narrow pipe."}),
    );
    let (status, body) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["accuracy"], 8);
    assert_eq!(body["clarity"], 6);
    assert_eq!(body["overall"], 7);
    assert!(body.get("score").is_none());
}

#[tokio::test]
async fn test_unreachable_model_serves_fallback_with_warning() {
    let app = setup_test_app(Arc::new(StubFeedback::offline()));
    let req = post_json(
        "/evaluate/explanation",
        json!({"topic": "Ohm's Law", "content": "V = IR"}),
    );
    let (status, body) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"], 7);
    assert_eq!(body["strengths"], "Shows good understanding");
    assert_eq!(body["warning"], "OpenAI evaluation unavailable");

    let req = post_json(
        "/evaluate/analogy",
        json!({"topic": "Ohm's Law", "content": "pipes"}),
    );
    let (_, body) = json_response(&app, req).await;
    assert_eq!(body["overall"], 7);
    assert_eq!(body["improvements"], "Could be more specific");
    assert_eq!(body["warning"], "OpenAI evaluation unavailable");
}

#[tokio::test]
async fn test_blank_topic_or_content_is_rejected() {
    let feedback = Arc::new(StubFeedback::default());
    let app = setup_test_app(feedback.clone());

    let req = post_json("/evaluate/explanation", json!({"topic": "   ", "content": "text"}));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "Missing topic or content");

    let req = post_json("/evaluate/analogy", json!({"topic": "Ohm's Law"}));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(feedback.contexts.lock().unwrap().is_empty());
    let (_, listing) = json_response(&app, get("/explanations")).await;
    assert_eq!(listing["count"], 0);
}

#[tokio::test]
async fn test_ask_question_answers_and_honors_type_alias() {
    let feedback = Arc::new(StubFeedback::default());
    let app = setup_test_app(feedback.clone());
    let req = post_json(
        "/ask-question",
        json!({
            "topic": "Capacitors",
            "content": "A bucket for charge",
            "question": "Is this accurate?",
            "type": "analogy"
        }),
    );
    let (status, body) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "- **Capacitors**: keep it short");
    assert!(body.get("warning").is_none());
    assert_eq!(*feedback.kinds.lock().unwrap(), vec![DraftKind::Analogy]);
}

#[tokio::test]
async fn test_ask_question_falls_back_to_offline_reply() {
    let app = setup_test_app(Arc::new(StubFeedback::offline()));
    let req = post_json(
        "/ask-question",
        json!({"topic": "Ohm's Law", "content": "V = IR", "question": "What next?"}),
    );
    let (status, body) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().unwrap().starts_with("(Offline)"));
    assert_eq!(body["warning"], "OpenAI unavailable");
}

#[tokio::test]
async fn test_ask_question_requires_every_field() {
    let app = setup_test_app(Arc::new(StubFeedback::default()));
    let req = post_json(
        "/ask-question",
        json!({"topic": "Ohm's Law", "content": "V = IR", "question": " "}),
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "Missing fields");
}

#[tokio::test]
async fn test_inline_context_reaches_the_model() {
    let feedback = Arc::new(StubFeedback::default());
    let app = setup_test_app(feedback.clone());
    let req = post_json(
        "/evaluate/explanation",
        json!({
            "topic": "Ohm's Law",
            "content": "V = IR",
            "contextName": "notes.txt",
            "contextData": "Resistance is measured in ohms."
        }),
    );
    let (status, _) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let contexts = feedback.contexts.lock().unwrap();
    let ctx = contexts[0].as_ref().expect("context forwarded");
    assert_eq!(ctx.name, "notes.txt");
    assert_eq!(ctx.content, "Resistance is measured in ohms.");
}

#[tokio::test]
async fn test_uploaded_text_file_is_used_via_file_id_header() {
    let feedback = Arc::new(StubFeedback::default());
    let app = setup_test_app(feedback.clone());

    let (status, uploaded) =
        json_response(&app, upload("notes.txt", "text/plain", "Current is flow.")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["filename"], "notes.txt");
    assert_eq!(uploaded["content"], "Current is flow.");
    let file_id = uploaded["fileId"].as_str().expect("file id").to_string();
    let file_id_text = file_id.clone();

    let req = Request::builder()
        .method("POST")
        .uri("/ask-question")
        .header("content-type", "application/json")
        .header("x-file-id", file_id)
        .body(Body::from(
            json!({
                "topic": "Ohm's Law",
                "content": "V = IR",
                "question": "Where does current come from?",
                "contextName": "ignored.txt",
                "contextData": "stale"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let contexts = feedback.contexts.lock().unwrap();
    let ctx = contexts[0].as_ref().expect("context forwarded");
    assert_eq!(ctx.name, "notes.txt");
    assert_eq!(ctx.content, "Current is flow.");
    assert_eq!(ctx.file_id.map(|id| id.to_string()), Some(file_id_text));
}

#[tokio::test]
async fn test_pdf_upload_is_stored_by_name_only() {
    let app = setup_test_app(Arc::new(StubFeedback::default()));
    let (status, uploaded) =
        json_response(&app, upload("lecture.pdf", "application/pdf", "%PDF-1.4")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["filename"], "lecture.pdf");
    assert!(uploaded.get("content").is_none());
}

#[tokio::test]
async fn test_upload_without_file_part_is_rejected() {
    let app = setup_test_app(Arc::new(StubFeedback::default()));
    let boundary = "feynman-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let req = Request::builder()
        .method("POST")
        .uri("/files")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "Missing file");
}

#[tokio::test]
async fn test_unknown_file_id_falls_back_to_inline_context() {
    let feedback = Arc::new(StubFeedback::default());
    let app = setup_test_app(feedback.clone());
    let req = Request::builder()
        .method("POST")
        .uri("/evaluate/explanation")
        .header("content-type", "application/json")
        .header("x-file-id", "00000000-0000-4000-8000-000000000000")
        .body(Body::from(
            json!({"topic": "Ohm's Law", "content": "V = IR", "contextName": "slides.pdf"})
                .to_string(),
        ))
        .unwrap();
    let (status, _) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let contexts = feedback.contexts.lock().unwrap();
    let ctx = contexts[0].as_ref().expect("inline context kept");
    assert_eq!(ctx.name, "slides.pdf");
    assert!(ctx.content.is_empty());
}

#[test]
fn test_openapi_document_lists_every_route() {
    use utoipa::OpenApi;
    let doc = api_lib::web::rest::ApiDoc::openapi();
    for path in [
        "/health",
        "/evaluate/explanation",
        "/evaluate/analogy",
        "/ask-question",
        "/files",
        "/explanations",
        "/analogies",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {}", path);
    }
}
