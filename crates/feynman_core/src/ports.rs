//! crates/feynman_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the tutor's core logic.
//! These traits form the boundary of the hexagonal architecture: the wizard
//! depends only on them, while the HTTP client, the LLM adapters and the
//! in-memory stores live outside the core.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    DraftKind, Evaluated, EvaluationRequest, FileContext, QuestionRequest, StoredFile, Submission,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (storage, network, LLM).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A flat, string-keyed store scoped to one browsing session.
///
/// Methods take `&self`; implementations use interior mutability so one store
/// can be shared by every field controller on the page.
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Evaluates a draft. A degraded-but-successful evaluation carries a warning.
    async fn evaluate(&self, request: &EvaluationRequest) -> PortResult<Evaluated>;

    /// Answers a follow-up question about a draft.
    async fn ask_question(&self, request: &QuestionRequest) -> PortResult<String>;
}

#[async_trait]
pub trait SubmissionLog: Send + Sync {
    async fn record(&self, submission: Submission) -> PortResult<()>;

    async fn list(&self, kind: DraftKind) -> PortResult<Vec<Submission>>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores an upload whose text has already been extracted.
    async fn save(&self, context: FileContext, size: usize) -> PortResult<StoredFile>;

    async fn get(&self, file_id: Uuid) -> PortResult<StoredFile>;
}
