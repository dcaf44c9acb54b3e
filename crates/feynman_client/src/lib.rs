//! crates/feynman_client/src/lib.rs
//!
//! An adapter that implements the core `FeedbackService` port by calling the
//! evaluation service over HTTP. This is what the wizard uses in production;
//! tests substitute in-process stubs.

use async_trait::async_trait;
use feynman_core::attachment::FILE_ID_HEADER;
use feynman_core::domain::{
    AnalogyEvaluation, DraftKind, Evaluated, Evaluation, EvaluationRequest, ExplanationEvaluation,
    FileContext, QuestionRequest,
};
use feynman_core::ports::{FeedbackService, PortError, PortResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct EvaluateBody<'a> {
    topic: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_data: Option<&'a str>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AskBody<'a> {
    topic: &'a str,
    content: &'a str,
    question: &'a str,
    kind: DraftKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_data: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct EvaluateReply<T> {
    #[serde(flatten)]
    evaluation: T,
    warning: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AskReply {
    reply: String,
}

/// The service's answer to a file upload.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_id: Uuid,
    pub filename: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl UploadedFile {
    /// The attachment the wizard keeps for this upload, tagged with the
    /// service's id so later requests can refer to it.
    pub fn to_context(&self) -> FileContext {
        FileContext::new(self.filename.clone(), self.content.clone().unwrap_or_default())
            .with_file_id(self.file_id)
    }
}

/// Splits an optional attachment into the two optional wire fields. Text the
/// service already holds under a file id is not sent again.
fn context_fields(context: Option<&FileContext>) -> (Option<&str>, Option<&str>) {
    match context {
        Some(ctx) => (
            Some(ctx.name.as_str()),
            Some(ctx.content.as_str()).filter(|c| !c.is_empty() && ctx.file_id.is_none()),
        ),
        None => (None, None),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpFeedbackClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFeedbackClient {
    /// Creates a client for the service at `base_url`, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A JSON POST, naming the stored upload in `x-file-id` when there is one.
    fn json_request<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        context: Option<&FileContext>,
    ) -> reqwest::RequestBuilder {
        let builder = self.http.post(self.endpoint(path)).json(body);
        match context.and_then(|ctx| ctx.file_id) {
            Some(file_id) => builder.header(FILE_ID_HEADER, file_id.to_string()),
            None => builder,
        }
    }

    fn evaluate_request(&self, request: &EvaluationRequest) -> reqwest::RequestBuilder {
        let (context_name, context_data) = context_fields(request.context.as_ref());
        let body = EvaluateBody {
            topic: &request.topic,
            content: &request.content,
            context_name,
            context_data,
        };
        let path = match request.kind {
            DraftKind::Explanation => "/evaluate/explanation",
            DraftKind::Analogy => "/evaluate/analogy",
        };
        self.json_request(path, &body, request.context.as_ref())
    }

    fn ask_request(&self, request: &QuestionRequest) -> reqwest::RequestBuilder {
        let (context_name, context_data) = context_fields(request.context.as_ref());
        let body = AskBody {
            topic: &request.topic,
            content: &request.content,
            question: &request.question,
            kind: request.kind,
            context_name,
            context_data,
        };
        self.json_request("/ask-question", &body, request.context.as_ref())
    }

    async fn send_json<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> PortResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "Request failed ({}): {}",
                status, text
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    /// Uploads a file to the service's file store.
    pub async fn upload_file(
        &self,
        name: &str,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> PortResult<UploadedFile> {
        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_string());
        if let Some(mime) = mime {
            part = part
                .mime_str(mime)
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .http
            .post(self.endpoint("/files"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "Upload failed ({})",
                response.status()
            )));
        }
        response
            .json::<UploadedFile>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `FeedbackService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FeedbackService for HttpFeedbackClient {
    async fn evaluate(&self, request: &EvaluationRequest) -> PortResult<Evaluated> {
        debug!("Posting {} for evaluation", request.kind);
        let builder = self.evaluate_request(request);
        let (evaluation, warning) = match request.kind {
            DraftKind::Explanation => {
                let reply: EvaluateReply<ExplanationEvaluation> = Self::send_json(builder).await?;
                (Evaluation::Explanation(reply.evaluation), reply.warning)
            }
            DraftKind::Analogy => {
                let reply: EvaluateReply<AnalogyEvaluation> = Self::send_json(builder).await?;
                (Evaluation::Analogy(reply.evaluation), reply.warning)
            }
        };
        if let Some(w) = &warning {
            warn!("Evaluation came back degraded: {}", w);
        }
        Ok(Evaluated {
            evaluation,
            warning,
        })
    }

    async fn ask_question(&self, request: &QuestionRequest) -> PortResult<String> {
        let reply: AskReply = Self::send_json(self.ask_request(request)).await?;
        Ok(reply.reply)
    }
}
