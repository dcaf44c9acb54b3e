//! crates/feynman_core/src/conversation.rs
//!
//! The follow-up conversation attached to one version of a draft.

use tracing::{debug, warn};

use crate::domain::{ConversationTurn, QuestionRequest};
use crate::ports::{FeedbackService, PortResult};

/// Answer used when the tutoring call fails, so no question goes unanswered.
pub const OFFLINE_REPLY: &str =
    "(Offline) Try: define terms briefly, add a concrete example, and restate the idea in one sentence.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingReply,
}

/// A question that has been shown in the thread and awaits its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    epoch: u64,
    pub question: String,
}

#[derive(Debug)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    input: String,
    state: ConversationState,
    epoch: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            input: String::new(),
            state: ConversationState::Idle,
            epoch: 0,
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn can_submit(&self) -> bool {
        self.state == ConversationState::Idle && !self.input.trim().is_empty()
    }

    /// Appends the user's question immediately and clears the input.
    /// Returns `None` for a blank question or while a reply is pending.
    pub fn submit(&mut self) -> Option<PendingQuestion> {
        if !self.can_submit() {
            return None;
        }
        let question = self.input.trim().to_string();
        self.input.clear();
        self.turns.push(ConversationTurn::user(question.clone()));
        self.state = ConversationState::AwaitingReply;
        Some(PendingQuestion {
            epoch: self.epoch,
            question,
        })
    }

    /// Appends exactly one assistant turn for `pending`: the reply, or the
    /// offline fallback on failure. Replies to a conversation that has since
    /// been reset are dropped and `false` is returned.
    pub fn receive(&mut self, pending: &PendingQuestion, reply: PortResult<String>) -> bool {
        if pending.epoch != self.epoch {
            debug!("Dropping reply to a question from a previous draft");
            return false;
        }
        let content = match reply {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => OFFLINE_REPLY.to_string(),
            Err(e) => {
                warn!("Question failed, answering offline: {}", e);
                OFFLINE_REPLY.to_string()
            }
        };
        self.turns.push(ConversationTurn::assistant(content));
        self.state = ConversationState::Idle;
        true
    }

    /// Clears the history; the draft it was about has changed.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.turns.clear();
        self.input.clear();
        self.state = ConversationState::Idle;
    }

    /// Submits the current input and waits for the answer.
    pub async fn ask(
        &mut self,
        service: &dyn FeedbackService,
        request_for: impl FnOnce(String) -> QuestionRequest,
    ) -> bool {
        let Some(pending) = self.submit() else {
            return false;
        };
        let request = request_for(pending.question.clone());
        let reply = service.ask_question(&request).await;
        self.receive(&pending, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DraftKind, Role};
    use crate::evaluation::testing::ScriptedService;
    use crate::ports::PortError;

    fn request_for(question: String) -> QuestionRequest {
        QuestionRequest {
            kind: DraftKind::Explanation,
            topic: "Ohm's Law".into(),
            content: "V=IR".into(),
            question,
            context: None,
        }
    }

    #[test]
    fn submit_appends_user_turn_and_clears_input() {
        let mut convo = Conversation::new();
        convo.set_input("  what is resistance?  ");
        let pending = convo.submit().unwrap();

        assert_eq!(pending.question, "what is resistance?");
        assert_eq!(convo.input(), "");
        assert_eq!(convo.turns(), &[ConversationTurn::user("what is resistance?")]);
        assert_eq!(convo.state(), ConversationState::AwaitingReply);
    }

    #[test]
    fn blank_questions_are_ignored() {
        let mut convo = Conversation::new();
        convo.set_input("   ");
        assert!(convo.submit().is_none());
        assert!(convo.turns().is_empty());
    }

    #[test]
    fn no_second_question_while_awaiting() {
        let mut convo = Conversation::new();
        convo.set_input("one");
        convo.submit().unwrap();
        convo.set_input("two");
        assert!(convo.submit().is_none());
        assert_eq!(convo.turns().len(), 1);
    }

    #[test]
    fn failure_still_answers_the_user() {
        let mut convo = Conversation::new();
        convo.set_input("why?");
        let pending = convo.submit().unwrap();
        assert!(convo.receive(&pending, Err(PortError::Unavailable("down".into()))));

        assert_eq!(convo.turns().len(), 2);
        assert_eq!(convo.turns()[1].role, Role::Assistant);
        assert_eq!(convo.turns()[1].content, OFFLINE_REPLY);
        assert_eq!(convo.state(), ConversationState::Idle);
    }

    #[test]
    fn reset_empties_history_and_drops_late_replies() {
        let mut convo = Conversation::new();
        convo.set_input("why?");
        let pending = convo.submit().unwrap();
        convo.reset();

        assert!(convo.turns().is_empty());
        assert!(!convo.receive(&pending, Ok("because".into())));
        assert!(convo.turns().is_empty());
        assert_eq!(convo.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn ask_round_trips_through_service() {
        let service = ScriptedService::default();
        let mut convo = Conversation::new();
        convo.set_input("What does R mean?");

        assert!(convo.ask(&service, request_for).await);

        let roles: Vec<Role> = convo.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert!(convo.turns()[1].content.contains("What does R mean?"));
        assert_eq!(service.questions.lock().unwrap()[0].content, "V=IR");
    }

    #[tokio::test]
    async fn every_question_gets_exactly_one_answer() {
        let service = ScriptedService {
            fail_questions: true,
            ..Default::default()
        };
        let mut convo = Conversation::new();
        for q in ["a", "b", "c"] {
            convo.set_input(q);
            convo.ask(&service, request_for).await;
        }
        assert_eq!(convo.turns().len(), 6);
        for pair in convo.turns().chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }
}
