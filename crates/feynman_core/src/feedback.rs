//! crates/feynman_core/src/feedback.rs
//!
//! The feedback screen shared by explanation and analogy feedback. It owns one
//! draft, the evaluation panel for it, the follow-up conversation and the retry
//! input, and keeps them consistent: whenever the draft changes, the
//! conversation is reset and a fresh evaluation is requested.

use std::sync::Arc;

use tracing::info;

use crate::attachment;
use crate::conversation::{Conversation, PendingQuestion};
use crate::domain::{DraftKind, Evaluated, EvaluationRequest, FileContext, QuestionRequest};
use crate::evaluation::{Commit, EvaluationClient, EvaluationPanel, EvaluationTicket, PanelState};
use crate::field::DraftField;
use crate::navigation::{params, resolve_step, Location, Step, SIMPLE_EXPLANATION_PATH};
use crate::ports::{DraftStore, PortResult};
use crate::retry::{RetryInput, RetrySubmission};
use crate::store::{self, StoreKey};
use crate::wizard::{self, DEFAULT_TOPIC};

/// The two input tabs below the feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Question,
    Retry,
}

/// What the shared submit action started.
#[derive(Debug)]
pub enum Submitted {
    Question(PendingQuestion, QuestionRequest),
    Retry(RetrySubmission),
}

/// The effects of an applied retry.
#[derive(Debug)]
pub struct RetryApplied {
    /// The fresh evaluation the new draft needs.
    pub ticket: EvaluationTicket,
    /// Where the browser should now point so a reload shows the new draft.
    pub location: Location,
}

pub struct FeedbackScreen {
    kind: DraftKind,
    store: Arc<dyn DraftStore>,
    topic: DraftField,
    draft: DraftField,
    context: Option<FileContext>,
    panel: EvaluationPanel,
    conversation: Conversation,
    retry: RetryInput,
    tab: Tab,
}

impl FeedbackScreen {
    /// Opens the screen for a feedback location. The kind follows the step
    /// resolver; the draft comes from `?text=` (or `?exp=` for explanations),
    /// then the store, then the default draft.
    pub fn open(store: Arc<dyn DraftStore>, location: &Location) -> Self {
        let kind = match resolve_step(location) {
            Step::AnalogyFeedback => DraftKind::Analogy,
            _ => DraftKind::Explanation,
        };
        let topic = DraftField::mount_from(
            store.clone(),
            StoreKey::Topic,
            location,
            &[params::TOPIC],
            DEFAULT_TOPIC,
        );
        let names: &[&str] = match kind {
            DraftKind::Explanation => &[params::TEXT, params::EXP],
            DraftKind::Analogy => &[params::TEXT],
        };
        let key = wizard::draft_key(kind);
        let url_text = names
            .iter()
            .find_map(|name| location.param(name).filter(|v| !v.trim().is_empty()));
        let restored = url_text
            .and_then(|text| wizard::restore_truncated(text, store::load(store.as_ref(), key)));
        let draft = DraftField::mount(
            store.clone(),
            key,
            restored.as_deref().or(url_text),
            wizard::default_draft(kind),
        );
        let context = attachment::current(store.as_ref());
        Self {
            kind,
            store,
            topic,
            draft,
            context,
            panel: EvaluationPanel::new(),
            conversation: Conversation::new(),
            retry: RetryInput::new(),
            tab: Tab::Question,
        }
    }

    pub fn kind(&self) -> DraftKind {
        self.kind
    }

    pub fn title(&self) -> String {
        format!("{} Feedback", self.kind.label())
    }

    pub fn topic(&self) -> &str {
        self.topic.value()
    }

    pub fn content(&self) -> &str {
        self.draft.value()
    }

    pub fn context(&self) -> Option<&FileContext> {
        self.context.as_ref()
    }

    pub fn panel(&self) -> &PanelState {
        self.panel.state()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn retry(&self) -> &RetryInput {
        &self.retry
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// The URL that reproduces the current draft on reload.
    pub fn location(&self) -> Location {
        wizard::feedback_location(self.kind, self.topic(), self.content())
    }

    pub fn evaluation_request(&self) -> EvaluationRequest {
        EvaluationRequest {
            kind: self.kind,
            topic: self.topic().to_string(),
            content: self.content().to_string(),
            context: self.context.clone(),
        }
    }

    fn question_request(&self, question: String) -> QuestionRequest {
        QuestionRequest {
            kind: self.kind,
            topic: self.topic().to_string(),
            content: self.content().to_string(),
            question,
            context: self.context.clone(),
        }
    }

    //-------------------------------------------------------------------------------------
    // Evaluation
    //-------------------------------------------------------------------------------------

    /// Starts an evaluation when kind, topic or content differ from the last
    /// request. Called on entry and after every draft change.
    pub fn start_evaluation(&mut self) -> Option<EvaluationTicket> {
        let request = self.evaluation_request();
        if !self.panel.needs_refresh(&request) {
            return None;
        }
        Some(self.panel.begin(request))
    }

    pub fn apply_evaluation(
        &mut self,
        ticket: &EvaluationTicket,
        result: PortResult<Evaluated>,
    ) -> Commit {
        self.panel.commit(ticket, result)
    }

    /// Drops interest in in-flight requests when navigating away.
    pub fn leave(&mut self) {
        self.panel.invalidate();
    }

    //-------------------------------------------------------------------------------------
    // Tabs and the shared submit action
    //-------------------------------------------------------------------------------------

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Types into whichever tab is active.
    pub fn set_input(&mut self, text: impl Into<String>) {
        match self.tab {
            Tab::Question => self.conversation.set_input(text),
            Tab::Retry => self.retry.set_text(text),
        }
    }

    pub fn can_submit(&self) -> bool {
        match self.tab {
            Tab::Question => self.conversation.can_submit(),
            Tab::Retry => self.retry.can_submit(),
        }
    }

    pub fn submit(&mut self) -> Option<Submitted> {
        match self.tab {
            Tab::Question => self
                .ask()
                .map(|(pending, request)| Submitted::Question(pending, request)),
            Tab::Retry => self.begin_retry().map(Submitted::Retry),
        }
    }

    //-------------------------------------------------------------------------------------
    // Conversation
    //-------------------------------------------------------------------------------------

    /// Posts the typed question to the thread and builds its request.
    pub fn ask(&mut self) -> Option<(PendingQuestion, QuestionRequest)> {
        let pending = self.conversation.submit()?;
        let request = self.question_request(pending.question.clone());
        Some((pending, request))
    }

    pub fn receive_answer(&mut self, pending: &PendingQuestion, reply: PortResult<String>) -> bool {
        self.conversation.receive(pending, reply)
    }

    //-------------------------------------------------------------------------------------
    // Retry
    //-------------------------------------------------------------------------------------

    pub fn begin_retry(&mut self) -> Option<RetrySubmission> {
        self.retry.begin()
    }

    /// Applies a submitted revision in one step: the draft is replaced and
    /// persisted, the retry input cleared, the conversation reset, a fresh
    /// evaluation begun and the reload URL updated.
    pub fn complete_retry(&mut self, submission: RetrySubmission) -> RetryApplied {
        info!("Retrying {} with a revised draft", self.kind);
        self.draft.edit(submission.text);
        self.retry.finish();
        self.conversation.reset();
        self.tab = Tab::Question;
        let ticket = self.panel.begin(self.evaluation_request());
        RetryApplied {
            ticket,
            location: self.location(),
        }
    }

    //-------------------------------------------------------------------------------------
    // Navigation
    //-------------------------------------------------------------------------------------

    /// Back to the authoring step of this draft.
    pub fn back(&self) -> Location {
        match self.kind {
            DraftKind::Explanation => {
                Location::new(SIMPLE_EXPLANATION_PATH).with(params::TOPIC, self.topic())
            }
            DraftKind::Analogy => wizard::create_analogy_location(self.topic(), None),
        }
    }

    /// Accepts the draft and moves on: explanations seed the analogy step,
    /// analogies finish at the review.
    pub fn advance(&self) -> Location {
        match self.kind {
            DraftKind::Explanation => {
                wizard::create_analogy_location(self.topic(), Some(self.content()))
            }
            DraftKind::Analogy => {
                store::save(self.store.as_ref(), StoreKey::Analogy, self.content());
                store::save(self.store.as_ref(), StoreKey::Topic, self.topic());
                wizard::review_location(self.topic(), self.content())
            }
        }
    }

    //-------------------------------------------------------------------------------------
    // Async drivers
    //-------------------------------------------------------------------------------------

    /// Evaluates the current draft if it needs it.
    pub async fn refresh(&mut self, client: &EvaluationClient) -> Option<Commit> {
        let ticket = self.start_evaluation()?;
        let result = client.fetch(&ticket).await;
        Some(self.apply_evaluation(&ticket, result))
    }

    /// Submits the typed question and records the answer.
    pub async fn ask_question(&mut self, client: &EvaluationClient) -> bool {
        let Some((pending, request)) = self.ask() else {
            return false;
        };
        let reply = client.service().ask_question(&request).await;
        self.receive_answer(&pending, reply)
    }

    /// Submits the typed revision, applies it and evaluates it. Returns the
    /// new reload URL, or `None` when the submission was rejected.
    pub async fn retry_with(&mut self, client: &EvaluationClient) -> Option<Location> {
        let submission = self.begin_retry()?;
        let applied = self.complete_retry(submission);
        let result = client.fetch(&applied.ticket).await;
        self.apply_evaluation(&applied.ticket, result);
        Some(applied.location)
    }
}
