//! crates/feynman_core/src/domain.rs
//!
//! Defines the pure, core data structures for the tutor.
//! Serde derives describe the JSON shapes exchanged with the evaluation service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which draft a screen or request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    Explanation,
    Analogy,
}

impl DraftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftKind::Explanation => "explanation",
            DraftKind::Analogy => "analogy",
        }
    }

    /// `"analogy"` selects the analogy draft; anything else, including absence,
    /// selects the explanation draft.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("analogy") => DraftKind::Analogy,
            _ => DraftKind::Explanation,
        }
    }

    /// Capitalized label used in headings ("Your Analogy:").
    pub fn label(&self) -> &'static str {
        match self {
            DraftKind::Explanation => "Explanation",
            DraftKind::Analogy => "Analogy",
        }
    }
}

impl fmt::Display for DraftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attached file reduced to its name and extracted text.
/// `content` is empty when extraction was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub name: String,
    pub content: String,
    /// Set once the evaluation service holds a copy of the upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Uuid>,
}

impl FileContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            file_id: None,
        }
    }

    pub fn with_file_id(mut self, file_id: Uuid) -> Self {
        self.file_id = Some(file_id);
        self
    }
}

/// Structured feedback on a simple explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationEvaluation {
    pub score: u8,
    pub strengths: String,
    pub improvements: String,
    pub suggestions: String,
}

impl ExplanationEvaluation {
    /// Used when the model answers with something that is not the expected JSON.
    pub fn fallback() -> Self {
        Self {
            score: 7,
            strengths: "Shows good understanding".to_string(),
            improvements: "Add relatable examples".to_string(),
            suggestions: "Use everyday objects for comparison".to_string(),
        }
    }
}

/// Structured feedback on an analogy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogyEvaluation {
    pub accuracy: u8,
    pub clarity: u8,
    pub overall: u8,
    pub strengths: String,
    pub improvements: String,
}

impl AnalogyEvaluation {
    pub fn fallback() -> Self {
        Self {
            accuracy: 7,
            clarity: 7,
            overall: 7,
            strengths: "Good use of familiar concepts".to_string(),
            improvements: "Could be more specific".to_string(),
        }
    }
}

/// One evaluation result; the shape depends on the draft kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evaluation {
    Explanation(ExplanationEvaluation),
    Analogy(AnalogyEvaluation),
}

impl Evaluation {
    pub fn kind(&self) -> DraftKind {
        match self {
            Evaluation::Explanation(_) => DraftKind::Explanation,
            Evaluation::Analogy(_) => DraftKind::Analogy,
        }
    }

    pub fn fallback(kind: DraftKind) -> Self {
        match kind {
            DraftKind::Explanation => Evaluation::Explanation(ExplanationEvaluation::fallback()),
            DraftKind::Analogy => Evaluation::Analogy(AnalogyEvaluation::fallback()),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Explanation(e) => {
                writeln!(f, "Score: {} / 10", e.score)?;
                writeln!(f, "Strengths: {}", e.strengths)?;
                writeln!(f, "Improvements: {}", e.improvements)?;
                write!(f, "Suggestions: {}", e.suggestions)
            }
            Evaluation::Analogy(a) => {
                writeln!(f, "Accuracy: {}", a.accuracy)?;
                writeln!(f, "Clarity: {}", a.clarity)?;
                writeln!(f, "Overall: {}", a.overall)?;
                writeln!(f, "Strengths: {}", a.strengths)?;
                write!(f, "Improvements: {}", a.improvements)
            }
        }
    }
}

/// An evaluation together with the service's non-fatal warning, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluated {
    pub evaluation: Evaluation,
    pub warning: Option<String>,
}

impl Evaluated {
    pub fn new(evaluation: Evaluation) -> Self {
        Self {
            evaluation,
            warning: None,
        }
    }

    pub fn with_warning(evaluation: Evaluation, warning: impl Into<String>) -> Self {
        Self {
            evaluation,
            warning: Some(warning.into()),
        }
    }
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a feedback conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Input snapshot of one evaluation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub kind: DraftKind,
    pub topic: String,
    pub content: String,
    pub context: Option<FileContext>,
}

/// A follow-up question about one version of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub kind: DraftKind,
    pub topic: String,
    pub content: String,
    pub question: String,
    pub context: Option<FileContext>,
}

/// A draft that was sent for evaluation, kept by the service's submission log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub kind: DraftKind,
    pub topic: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub evaluation: Option<Evaluation>,
}

/// An uploaded file held by the service's file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: Uuid,
    pub size: usize,
    pub context: FileContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_param_only_matches_analogy() {
        assert_eq!(DraftKind::from_param(Some("analogy")), DraftKind::Analogy);
        assert_eq!(DraftKind::from_param(Some("explanation")), DraftKind::Explanation);
        assert_eq!(DraftKind::from_param(Some("Analogy")), DraftKind::Explanation);
        assert_eq!(DraftKind::from_param(None), DraftKind::Explanation);
    }

    #[test]
    fn explanation_display_shows_score_out_of_ten() {
        let eval = Evaluation::Explanation(ExplanationEvaluation {
            score: 8,
            strengths: "clear".into(),
            improvements: "examples".into(),
            suggestions: "use water".into(),
        });
        assert!(eval.to_string().starts_with("Score: 8 / 10"));
    }

    #[test]
    fn untagged_evaluation_picks_shape_from_fields() {
        let json = r#"{"accuracy":6,"clarity":8,"overall":7,"strengths":"s","improvements":"i"}"#;
        let eval: Evaluation = serde_json::from_str(json).unwrap();
        assert_eq!(eval.kind(), DraftKind::Analogy);
    }
}
