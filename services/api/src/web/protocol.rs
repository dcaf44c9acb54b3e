//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the wizard and the evaluation
//! service. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use feynman_core::domain::{
    AnalogyEvaluation, DraftKind, Evaluated, Evaluation, ExplanationEvaluation, FileContext,
    Submission,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Requests Sent FROM the Wizard TO the Server
//=========================================================================================

/// A draft to evaluate. Missing strings deserialize as empty and are rejected
/// by the handler, so every validation failure is a plain 400.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequestBody {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub content: String,
    /// Name of the attached file, if any.
    pub context_name: Option<String>,
    /// Extracted text of the attached file, if any.
    pub context_data: Option<String>,
}

/// A follow-up question about one draft.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequestBody {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub question: String,
    /// `"analogy"` or `"explanation"`; anything else is treated as an explanation.
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub context_name: Option<String>,
    pub context_data: Option<String>,
}

impl AskRequestBody {
    pub fn draft_kind(&self) -> DraftKind {
        DraftKind::from_param(self.kind.as_deref())
    }
}

/// Builds the attachment a request describes. A name alone still counts,
/// so the tutor knows a file was attached even when it had no text.
pub fn body_context(name: Option<&str>, data: Option<&str>) -> Option<FileContext> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let data = data.filter(|d| !d.trim().is_empty());
    if name.is_none() && data.is_none() {
        return None;
    }
    Some(FileContext::new(
        name.unwrap_or("attachment"),
        data.unwrap_or_default(),
    ))
}

//=========================================================================================
// Responses Sent FROM the Server TO the Wizard
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ExplanationEvaluationResponse {
    pub score: u8,
    pub strengths: String,
    pub improvements: String,
    pub suggestions: String,
    /// Present when the model could not be reached and defaults were returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ExplanationEvaluationResponse {
    pub fn new(evaluation: ExplanationEvaluation, warning: Option<String>) -> Self {
        Self {
            score: evaluation.score,
            strengths: evaluation.strengths,
            improvements: evaluation.improvements,
            suggestions: evaluation.suggestions,
            warning,
        }
    }
}

impl From<Evaluated> for ExplanationEvaluationResponse {
    fn from(evaluated: Evaluated) -> Self {
        match evaluated.evaluation {
            Evaluation::Explanation(e) => Self::new(e, evaluated.warning),
            Evaluation::Analogy(_) => {
                Self::new(ExplanationEvaluation::fallback(), evaluated.warning)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct AnalogyEvaluationResponse {
    pub accuracy: u8,
    pub clarity: u8,
    pub overall: u8,
    pub strengths: String,
    pub improvements: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AnalogyEvaluationResponse {
    pub fn new(evaluation: AnalogyEvaluation, warning: Option<String>) -> Self {
        Self {
            accuracy: evaluation.accuracy,
            clarity: evaluation.clarity,
            overall: evaluation.overall,
            strengths: evaluation.strengths,
            improvements: evaluation.improvements,
            warning,
        }
    }
}

impl From<Evaluated> for AnalogyEvaluationResponse {
    fn from(evaluated: Evaluated) -> Self {
        match evaluated.evaluation {
            Evaluation::Analogy(a) => Self::new(a, evaluated.warning),
            Evaluation::Explanation(_) => {
                Self::new(AnalogyEvaluation::fallback(), evaluated.warning)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct AskResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: Uuid,
    pub filename: String,
    /// Extracted text; absent for PDFs, binaries and oversized files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody {
    pub id: Uuid,
    pub kind: String,
    pub topic: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<Object>)]
    pub evaluation: Option<serde_json::Value>,
}

impl From<Submission> for SubmissionBody {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            kind: submission.kind.as_str().to_string(),
            topic: submission.topic,
            content: submission.content,
            created_at: submission.created_at,
            evaluation: submission
                .evaluation
                .and_then(|e| serde_json::to_value(e).ok()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmissionListResponse {
    pub count: usize,
    pub data: Vec<SubmissionBody>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
