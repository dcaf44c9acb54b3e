//! crates/feynman_core/src/evaluation.rs
//!
//! The evaluation client and the panel state it drives.
//!
//! Responses can arrive out of order. Every request is tagged with a ticket
//! holding a monotonically increasing sequence number and the input snapshot
//! that triggered it; a response is committed only while its ticket is still
//! the newest one issued by the panel.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Evaluated, EvaluationRequest};
use crate::ports::{FeedbackService, PortResult};

/// Shown in place of the evaluation panel when a request fails.
pub const EVALUATION_FAILED_MESSAGE: &str = "Failed to fetch evaluation";

/// The transient states of one feedback screen's evaluation panel.
/// Error and success are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready(Evaluated),
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelState::Idle => f.write_str("No evaluation available."),
            PanelState::Loading => f.write_str("Evaluating…"),
            PanelState::Failed(message) => f.write_str(message),
            PanelState::Ready(evaluated) => {
                if let Some(warning) = &evaluated.warning {
                    writeln!(f, "Warning: {}", warning)?;
                }
                write!(f, "{}", evaluated.evaluation)
            }
        }
    }
}

/// Identifies one in-flight evaluation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTicket {
    seq: u64,
    request: EvaluationRequest,
}

impl EvaluationTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &EvaluationRequest {
        &self.request
    }
}

/// What happened to a response handed to [`EvaluationPanel::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct EvaluationPanel {
    seq: u64,
    state: PanelState,
    snapshot: Option<EvaluationRequest>,
}

impl EvaluationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Whether `request` differs from the snapshot of the newest request.
    /// Any change of kind, topic or content calls for a fresh evaluation.
    pub fn needs_refresh(&self, request: &EvaluationRequest) -> bool {
        match &self.snapshot {
            Some(current) => {
                current.kind != request.kind
                    || current.topic != request.topic
                    || current.content != request.content
            }
            None => true,
        }
    }

    /// Starts a new request, superseding any in flight.
    pub fn begin(&mut self, request: EvaluationRequest) -> EvaluationTicket {
        self.seq += 1;
        self.state = PanelState::Loading;
        self.snapshot = Some(request.clone());
        EvaluationTicket {
            seq: self.seq,
            request,
        }
    }

    /// Commits a response if its ticket is still current; otherwise drops it.
    /// A new result fully replaces the previous one.
    pub fn commit(&mut self, ticket: &EvaluationTicket, result: PortResult<Evaluated>) -> Commit {
        if ticket.seq != self.seq {
            debug!(
                "Discarding stale evaluation #{} (current is #{})",
                ticket.seq, self.seq
            );
            return Commit::Stale;
        }
        self.state = match result {
            Ok(evaluated) => PanelState::Ready(evaluated),
            Err(e) => {
                warn!("Evaluation #{} failed: {}", ticket.seq, e);
                PanelState::Failed(EVALUATION_FAILED_MESSAGE.to_string())
            }
        };
        Commit::Applied
    }

    /// Stops caring about whatever is in flight, e.g. when leaving the screen.
    pub fn invalidate(&mut self) {
        self.seq += 1;
        if self.state == PanelState::Loading {
            self.state = PanelState::Idle;
        }
    }
}

/// Calls the feedback service for a ticket. Holds no panel state so that
/// several calls can be in flight while the panel keeps changing.
#[derive(Clone)]
pub struct EvaluationClient {
    service: Arc<dyn FeedbackService>,
}

impl EvaluationClient {
    pub fn new(service: Arc<dyn FeedbackService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<dyn FeedbackService> {
        &self.service
    }

    pub async fn fetch(&self, ticket: &EvaluationTicket) -> PortResult<Evaluated> {
        debug!(
            "Requesting {} evaluation #{} for topic '{}'",
            ticket.request.kind, ticket.seq, ticket.request.topic
        );
        self.service.evaluate(&ticket.request).await
    }

    /// Begins, fetches and commits in one go.
    pub async fn evaluate(
        &self,
        panel: &mut EvaluationPanel,
        request: EvaluationRequest,
    ) -> Commit {
        let ticket = panel.begin(request);
        let result = self.fetch(&ticket).await;
        panel.commit(&ticket, result)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::{Evaluation, ExplanationEvaluation, QuestionRequest};
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scores explanations by content length and records every request.
    #[derive(Default)]
    pub struct ScriptedService {
        pub requests: Mutex<Vec<EvaluationRequest>>,
        pub questions: Mutex<Vec<QuestionRequest>>,
        pub fail_evaluations: bool,
        pub fail_questions: bool,
    }

    pub fn explanation(score: u8) -> Evaluation {
        Evaluation::Explanation(ExplanationEvaluation {
            score,
            strengths: "clear".into(),
            improvements: "examples".into(),
            suggestions: "use water".into(),
        })
    }

    #[async_trait]
    impl FeedbackService for ScriptedService {
        async fn evaluate(&self, request: &EvaluationRequest) -> PortResult<Evaluated> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail_evaluations {
                return Err(PortError::Unavailable("network down".into()));
            }
            Ok(Evaluated::new(explanation(request.content.len().min(10) as u8)))
        }

        async fn ask_question(&self, request: &QuestionRequest) -> PortResult<String> {
            self.questions.lock().unwrap().push(request.clone());
            if self.fail_questions {
                return Err(PortError::Unavailable("network down".into()));
            }
            Ok(format!("About '{}': define your terms.", request.question))
        }
    }
}
