//! services/api/src/adapters/feedback_llm.rs
//!
//! This module contains the adapter for the evaluating and tutoring LLM.
//! It implements the `FeedbackService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use feynman_core::{
    domain::{
        AnalogyEvaluation, DraftKind, Evaluated, Evaluation, EvaluationRequest,
        ExplanationEvaluation, FileContext, QuestionRequest,
    },
    ports::{FeedbackService, PortError, PortResult},
};
use serde_json::Value;
use tracing::{debug, warn};

/// Characters of attached text forwarded with an evaluation.
pub const EVALUATION_CONTEXT_CHARS: usize = 2000;
/// Characters of attached text forwarded with a tutoring question.
pub const QUESTION_CONTEXT_CHARS: usize = 1500;
/// Sent back when the model answers a question with nothing.
pub const EMPTY_REPLY: &str = "I couldn't generate a response right now.";

const EXPLANATION_SYSTEM_PROMPT: &str = "You are an educational expert. Evaluate explanations for 12-year-olds. Be encouraging but constructive. Respond in JSON format.";
const ANALOGY_SYSTEM_PROMPT: &str = "You are an educational expert. Evaluate learning analogies. Focus on accuracy and clarity. Respond in JSON format.";

//=========================================================================================
// Prompt Construction
//=========================================================================================

/// Renders the attachment preamble, or nothing when there is no attached text.
pub fn context_prefix(context: Option<&FileContext>, limit: usize) -> String {
    match context {
        Some(ctx) if !ctx.content.trim().is_empty() => {
            let name = if ctx.name.trim().is_empty() {
                "attachment"
            } else {
                ctx.name.as_str()
            };
            let excerpt: String = ctx.content.chars().take(limit).collect();
            format!("Context from {}:\n{}\n\n", name, excerpt)
        }
        _ => String::new(),
    }
}

fn evaluation_prompts(request: &EvaluationRequest) -> (&'static str, String) {
    let prefix = context_prefix(request.context.as_ref(), EVALUATION_CONTEXT_CHARS);
    match request.kind {
        DraftKind::Explanation => (
            EXPLANATION_SYSTEM_PROMPT,
            format!(
                "{}Evaluate this explanation of \"{}\" for a 12-year-old: \"{}\".\n\nProvide JSON with: score (1-10), strengths (string), improvements (string), suggestions (string)",
                prefix, request.topic, request.content
            ),
        ),
        DraftKind::Analogy => (
            ANALOGY_SYSTEM_PROMPT,
            format!(
                "{}Evaluate this analogy for \"{}\": \"{}\".\n\nProvide JSON with: accuracy (1-10), clarity (1-10), overall (1-10), strengths (string), improvements (string)",
                prefix, request.topic, request.content
            ),
        ),
    }
}

fn question_prompts(request: &QuestionRequest) -> (String, String) {
    let system = format!(
        "You are a helpful tutor. Answer questions to improve a student's {}. Keep answers concise and actionable.",
        request.kind
    );
    let user = format!(
        "{}Topic: {}\nStudent draft: {}\nQuestion: {}\n\nAnswer with 3-5 bullet points and use **bold** for key terms.",
        context_prefix(request.context.as_ref(), QUESTION_CONTEXT_CHARS),
        request.topic,
        request.content,
        request.question
    );
    (system, user)
}

//=========================================================================================
// Response Parsing
//=========================================================================================

/// Pulls the outermost JSON object out of a model reply, which may be wrapped
/// in prose or a fenced code block.
fn json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Reads a 1-10 score, accepting fractional or quoted numbers.
/// `NaN` and infinities are not scores.
fn score(value: &Value, field: &str) -> Option<u8> {
    let raw = match &value[field] {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then(|| raw.round().clamp(1.0, 10.0) as u8)
}

fn text(value: &Value, field: &str) -> Option<String> {
    value[field].as_str().map(str::to_string)
}

/// Parses the model's reply into the evaluation shape for `kind`.
/// Anything unusable yields `None` and the caller substitutes the fallback.
pub fn parse_evaluation(kind: DraftKind, reply: &str) -> Option<Evaluation> {
    let value = json_object(reply)?;
    match kind {
        DraftKind::Explanation => Some(Evaluation::Explanation(ExplanationEvaluation {
            score: score(&value, "score")?,
            strengths: text(&value, "strengths")?,
            improvements: text(&value, "improvements")?,
            suggestions: text(&value, "suggestions")?,
        })),
        DraftKind::Analogy => Some(Evaluation::Analogy(AnalogyEvaluation {
            accuracy: score(&value, "accuracy")?,
            clarity: score(&value, "clarity")?,
            overall: score(&value, "overall")?,
            strengths: text(&value, "strengths")?,
            improvements: text(&value, "improvements")?,
        })),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `FeedbackService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiFeedbackAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiFeedbackAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Sends one system/user exchange and returns the first choice's text.
    async fn complete(&self, system: &str, user: String, max_tokens: u32) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(max_tokens)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unavailable(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

//=========================================================================================
// `FeedbackService` Trait Implementation
//=========================================================================================

#[async_trait]
impl FeedbackService for OpenAiFeedbackAdapter {
    async fn evaluate(&self, request: &EvaluationRequest) -> PortResult<Evaluated> {
        let (system, user) = evaluation_prompts(request);
        let reply = self.complete(system, user, 400).await?;
        debug!("Evaluation model replied with {} chars", reply.len());

        let evaluation = parse_evaluation(request.kind, &reply).unwrap_or_else(|| {
            warn!("Could not parse {} evaluation; using fallback", request.kind);
            Evaluation::fallback(request.kind)
        });
        Ok(Evaluated::new(evaluation))
    }

    async fn ask_question(&self, request: &QuestionRequest) -> PortResult<String> {
        let (system, user) = question_prompts(request);
        let reply = self.complete(&system, user, 300).await?;
        if reply.trim().is_empty() {
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(reply)
    }
}
