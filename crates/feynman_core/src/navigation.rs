//! crates/feynman_core/src/navigation.rs
//!
//! Navigable locations (route + query) and the step resolver that maps a
//! location onto the wizard's progress rail.

use std::fmt;

use url::{form_urlencoded, Url};

use crate::domain::DraftKind;

pub const TOPIC_SELECTION_PATH: &str = "/";
pub const SIMPLE_EXPLANATION_PATH: &str = "/simple-explanation";
pub const SHARED_FEEDBACK_PATH: &str = "/shared-feedback";
pub const EXPLANATION_FEEDBACK_PATH: &str = "/explanation-feedback";
pub const CREATE_ANALOGY_PATH: &str = "/create-analogy";
pub const ANALOGY_FEEDBACK_PATH: &str = "/analogy-feedback";
pub const REVIEW_SUMMARY_PATH: &str = "/review-summary";

/// Query parameter names understood by the wizard screens.
pub mod params {
    pub const TOPIC: &str = "topic";
    pub const EXP: &str = "exp";
    pub const TEXT: &str = "text";
    pub const SEED: &str = "seed";
    pub const ANALOGY: &str = "analogy";
    pub const EXPLANATION: &str = "explanation";
    pub const TYPE: &str = "type";
    pub const FROM: &str = "from";
    pub const SOURCE: &str = "source";
}

/// A route path plus its ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parses a relative URL such as `/shared-feedback?type=analogy&topic=Ohm%27s+Law`.
    /// Unparseable input falls back to the root location.
    pub fn parse(input: &str) -> Self {
        let base = match Url::parse("http://wizard.local/") {
            Ok(base) => base,
            Err(_) => return Self::new(TOPIC_SELECTION_PATH),
        };
        match base.join(input) {
            Ok(url) => Self {
                path: url.path().to_string(),
                query: url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            },
            Err(_) => Self::new(TOPIC_SELECTION_PATH),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The first raw value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// A parameter only counts as present when it is non-empty after trimming.
    /// The returned value is trimmed.
    pub fn present_param(&self, key: &str) -> Option<&str> {
        self.param(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{}", encoded)?;
        }
        Ok(())
    }
}

//=========================================================================================
// Step Resolver
//=========================================================================================

/// The six steps of the wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    TopicSelection,
    SimpleExplanation,
    ExplanationFeedback,
    CreateAnalogy,
    AnalogyFeedback,
    ReviewSummary,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::TopicSelection,
        Step::SimpleExplanation,
        Step::ExplanationFeedback,
        Step::CreateAnalogy,
        Step::AnalogyFeedback,
        Step::ReviewSummary,
    ];

    /// 1-based position on the progress rail.
    pub fn number(&self) -> u8 {
        match self {
            Step::TopicSelection => 1,
            Step::SimpleExplanation => 2,
            Step::ExplanationFeedback => 3,
            Step::CreateAnalogy => 4,
            Step::AnalogyFeedback => 5,
            Step::ReviewSummary => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::TopicSelection => "Topic Selection",
            Step::SimpleExplanation => "Simple Explanation",
            Step::ExplanationFeedback => "Explanation Feedback",
            Step::CreateAnalogy => "Create Analogy",
            Step::AnalogyFeedback => "Analogy Feedback",
            Step::ReviewSummary => "Review & Summary",
        }
    }
}

/// Maps a location to the step it displays. Never gates navigation.
pub fn resolve_step(location: &Location) -> Step {
    match location.path().trim_end_matches('/') {
        SIMPLE_EXPLANATION_PATH => Step::SimpleExplanation,
        SHARED_FEEDBACK_PATH => match DraftKind::from_param(location.param(params::TYPE)) {
            DraftKind::Analogy => Step::AnalogyFeedback,
            DraftKind::Explanation => Step::ExplanationFeedback,
        },
        EXPLANATION_FEEDBACK_PATH => Step::ExplanationFeedback,
        CREATE_ANALOGY_PATH => Step::CreateAnalogy,
        ANALOGY_FEEDBACK_PATH => Step::AnalogyFeedback,
        REVIEW_SUMMARY_PATH => Step::ReviewSummary,
        _ => Step::TopicSelection,
    }
}

/// One row of the progress rail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepIndicator {
    pub step: Step,
    pub active: bool,
}

/// The full progress rail with the current step highlighted.
pub fn progress(location: &Location) -> Vec<StepIndicator> {
    let current = resolve_step(location);
    Step::ALL
        .iter()
        .map(|&step| StepIndicator {
            step,
            active: step == current,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_feedback_is_disambiguated_by_type() {
        let analogy = Location::parse("/shared-feedback?type=analogy&topic=Capacitors");
        let explanation = Location::parse("/shared-feedback?type=explanation");
        let untyped = Location::parse("/shared-feedback");
        let odd = Location::parse("/shared-feedback?type=poem");

        assert_eq!(resolve_step(&analogy), Step::AnalogyFeedback);
        assert_eq!(resolve_step(&explanation), Step::ExplanationFeedback);
        assert_eq!(resolve_step(&untyped), Step::ExplanationFeedback);
        assert_eq!(resolve_step(&odd), Step::ExplanationFeedback);
    }

    #[test]
    fn unknown_paths_resolve_to_topic_selection() {
        assert_eq!(resolve_step(&Location::parse("/")), Step::TopicSelection);
        assert_eq!(resolve_step(&Location::parse("/nowhere")), Step::TopicSelection);
        assert_eq!(resolve_step(&Location::parse("/review-summary/")), Step::ReviewSummary);
    }

    #[test]
    fn resolving_twice_is_stable() {
        let loc = Location::parse("/create-analogy?seed=abc");
        assert_eq!(resolve_step(&loc), resolve_step(&loc));
    }

    #[test]
    fn progress_highlights_exactly_one_step() {
        let rail = progress(&Location::parse("/review-summary?from=analogy-feedback"));
        assert_eq!(rail.len(), 6);
        let active: Vec<_> = rail.iter().filter(|s| s.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].step.number(), 6);
    }

    #[test]
    fn query_round_trips_through_display() {
        let loc = Location::new(SHARED_FEEDBACK_PATH)
            .with(params::TYPE, "analogy")
            .with(params::TOPIC, "Ohm's Law")
            .with(params::TEXT, "water & pipes = 100%");
        let parsed = Location::parse(&loc.to_string());
        assert_eq!(parsed, loc);
    }

    #[test]
    fn blank_params_are_not_present() {
        let loc = Location::parse("/simple-explanation?topic=%20%20&exp=");
        assert_eq!(loc.param("topic"), Some("  "));
        assert_eq!(loc.present_param("topic"), None);
        assert_eq!(loc.present_param("exp"), None);
    }
}
