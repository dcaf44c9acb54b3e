pub mod attachment;
pub mod conversation;
pub mod domain;
pub mod evaluation;
pub mod export;
pub mod feedback;
pub mod field;
pub mod navigation;
pub mod ports;
pub mod retry;
pub mod store;
pub mod wizard;

pub use domain::{
    AnalogyEvaluation, ConversationTurn, DraftKind, Evaluated, Evaluation, EvaluationRequest,
    ExplanationEvaluation, FileContext, QuestionRequest, Role, StoredFile, Submission,
};
pub use ports::{DraftStore, FeedbackService, FileStore, PortError, PortResult, SubmissionLog};
