//! crates/feynman_core/src/wizard.rs
//!
//! The authoring screens of the wizard: topic selection, simple explanation,
//! analogy creation, and the closing review. The feedback screens live in
//! `feedback.rs`.

use std::sync::Arc;

use crate::domain::DraftKind;
use crate::export::{self, ExportDocument};
use crate::field::DraftField;
use crate::navigation::{
    params, Location, ANALOGY_FEEDBACK_PATH, CREATE_ANALOGY_PATH, EXPLANATION_FEEDBACK_PATH,
    REVIEW_SUMMARY_PATH, SHARED_FEEDBACK_PATH, SIMPLE_EXPLANATION_PATH, TOPIC_SELECTION_PATH,
};
use crate::ports::DraftStore;
use crate::store::{self, StoreKey};

pub const DEFAULT_TOPIC: &str = "Ohm's Law";

pub const DEFAULT_EXPLANATION: &str = "Ohm's Law is a rule in electricity that shows how voltage, current, and resistance are connected with a formula using V, I, and R.";

pub const DEFAULT_ANALOGY: &str = "Ohm's Law is like water flowing through a pipe — the pressure pushes the water, the pipe's size slows it down, and how much water flows depends on both.";

/// Longest analogy placed in a URL.
pub const MAX_URL_DRAFT_CHARS: usize = 4000;

pub const SUGGESTED_TOPICS: [&str; 10] = [
    "Ohm's Law",
    "Kirchhoff's Laws",
    "Resistors and Resistance",
    "Capacitors",
    "Inductors",
    "Operational Amplifiers",
    "Superposition Theorem",
    "Impedance and Reactance",
    "First-Order Circuits",
    "Second-Order Circuits",
];

pub const ANALOGY_TEMPLATES: [&str; 3] = [
    "Water flowing through a pipe",
    "Cars on a road",
    "People entering a building",
];

/// Store key holding the draft of the given kind.
pub fn draft_key(kind: DraftKind) -> StoreKey {
    match kind {
        DraftKind::Explanation => StoreKey::Explanation,
        DraftKind::Analogy => StoreKey::Analogy,
    }
}

/// Default draft shown by screens that need something to display.
pub fn default_draft(kind: DraftKind) -> &'static str {
    match kind {
        DraftKind::Explanation => DEFAULT_EXPLANATION,
        DraftKind::Analogy => DEFAULT_ANALOGY,
    }
}

/// Where the feedback screen for `kind` lives, carrying the draft in the URL.
pub fn feedback_location(kind: DraftKind, topic: &str, text: &str) -> Location {
    Location::new(SHARED_FEEDBACK_PATH)
        .with(params::TYPE, kind.as_str())
        .with(params::TOPIC, topic)
        .with(params::TEXT, text)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Recovers a draft whose URL copy was cut at `MAX_URL_DRAFT_CHARS`. Returns
/// the stored draft when `url_text` sits exactly at the cap and the stored
/// draft extends it; otherwise the URL text stands.
pub fn restore_truncated(url_text: &str, stored: Option<String>) -> Option<String> {
    let stored = stored?;
    let at_cap = url_text.chars().count() == MAX_URL_DRAFT_CHARS;
    (at_cap && stored.len() > url_text.len() && stored.starts_with(url_text)).then_some(stored)
}

fn mount_topic(store: &Arc<dyn DraftStore>, location: &Location) -> DraftField {
    DraftField::mount_from(
        store.clone(),
        StoreKey::Topic,
        location,
        &[params::TOPIC],
        DEFAULT_TOPIC,
    )
}

//=========================================================================================
// Step 1: Topic Selection
//=========================================================================================

pub struct TopicSelection {
    store: Arc<dyn DraftStore>,
    input: String,
}

impl TopicSelection {
    pub fn open(store: Arc<dyn DraftStore>) -> Self {
        Self {
            store,
            input: String::new(),
        }
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTED_TOPICS
    }

    /// Picking a suggestion fills the input with it.
    pub fn select(&mut self, topic: &str) {
        self.input = topic.to_string();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_selected(&self, topic: &str) -> bool {
        self.input.trim() == topic
    }

    /// Saves the topic and moves on. A blank topic cannot proceed.
    pub fn proceed(&self) -> Option<Location> {
        let topic = self.input.trim();
        if topic.is_empty() {
            return None;
        }
        store::save(self.store.as_ref(), StoreKey::Topic, topic);
        Some(Location::new(SIMPLE_EXPLANATION_PATH).with(params::TOPIC, topic))
    }
}

//=========================================================================================
// Step 2: Simple Explanation
//=========================================================================================

pub struct SimpleExplanation {
    store: Arc<dyn DraftStore>,
    topic: DraftField,
    starter: Option<String>,
    text: String,
}

impl SimpleExplanation {
    /// The draft always starts empty here; only the topic is restored.
    pub fn open(store: Arc<dyn DraftStore>, location: &Location) -> Self {
        let topic = mount_topic(&store, location);
        Self {
            store,
            topic,
            starter: None,
            text: String::new(),
        }
    }

    pub fn topic(&self) -> &str {
        self.topic.value()
    }

    pub fn prompt(&self) -> String {
        format!(
            "Explain {} as if teaching a 12-year-old with no prior knowledge.",
            self.topic()
        )
    }

    pub fn starter_choices(&self) -> [String; 3] {
        let topic = self.topic();
        [
            format!("{} is…", topic),
            format!("The main idea of {} is…", topic),
            format!("{} means that…", topic),
        ]
    }

    pub fn choose_starter(&mut self, starter: impl Into<String>) {
        self.starter = Some(starter.into());
    }

    pub fn starter(&self) -> Option<&str> {
        self.starter.as_deref()
    }

    /// The text shown in the textarea: starter and body joined by a space.
    pub fn composed(&self) -> String {
        match &self.starter {
            Some(starter) => format!("{} {}", starter, self.text).trim_start().to_string(),
            None => self.text.clone(),
        }
    }

    /// Applies an edit of the composed text. Editing into the starter drops it.
    pub fn edit(&mut self, value: &str) {
        match &self.starter {
            Some(starter) if value.starts_with(starter.as_str()) => {
                self.text = value[starter.len()..].trim_start().to_string();
            }
            _ => {
                self.starter = None;
                self.text = value.to_string();
            }
        }
    }

    pub fn can_evaluate(&self) -> bool {
        !self.composed().trim().is_empty()
    }

    /// Saves the explanation and topic and moves to explanation feedback.
    pub fn evaluate(&self) -> Option<Location> {
        if !self.can_evaluate() {
            return None;
        }
        let payload = self.composed().trim().to_string();
        store::save(self.store.as_ref(), StoreKey::Explanation, &payload);
        store::save(self.store.as_ref(), StoreKey::Topic, self.topic());
        Some(
            feedback_location(DraftKind::Explanation, self.topic(), &payload)
                .with(params::SOURCE, "simple-explanation"),
        )
    }

    pub fn back(&self) -> Location {
        Location::new(TOPIC_SELECTION_PATH)
    }
}

//=========================================================================================
// Step 4: Create Analogy
//=========================================================================================

pub struct CreateAnalogy {
    topic: DraftField,
    draft: DraftField,
    template: Option<String>,
}

impl CreateAnalogy {
    /// The draft comes from `?seed=`, then the store, then starts empty.
    pub fn open(store: Arc<dyn DraftStore>, location: &Location) -> Self {
        let topic = mount_topic(&store, location);
        let draft = DraftField::mount_from(store, StoreKey::Analogy, location, &[params::SEED], "");
        Self {
            topic,
            draft,
            template: None,
        }
    }

    pub fn topic(&self) -> &str {
        self.topic.value()
    }

    pub fn text(&self) -> &str {
        self.draft.value()
    }

    pub fn templates(&self) -> &'static [&'static str] {
        &ANALOGY_TEMPLATES
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn edit(&mut self, value: impl Into<String>) {
        self.draft.edit(value);
    }

    /// Picks a template; a blank draft is scaffolded from it.
    pub fn pick_template(&mut self, template: &str) {
        self.template = Some(template.to_string());
        if self.draft.value().trim().is_empty() {
            let scaffold = format!(
                "{} is like {} — explain the mapping here.",
                self.topic(),
                template.to_lowercase()
            );
            self.draft.edit(scaffold);
        }
    }

    pub fn can_evaluate(&self) -> bool {
        !self.draft.value().trim().is_empty()
    }

    /// Saves the trimmed analogy and moves to analogy feedback.
    pub fn evaluate(&mut self) -> Option<Location> {
        if !self.can_evaluate() {
            return None;
        }
        let payload = self.draft.value().trim().to_string();
        self.draft.edit(payload.clone());
        self.topic.edit(self.topic.value().to_string());
        let safe = truncate_chars(&payload, MAX_URL_DRAFT_CHARS);
        Some(
            feedback_location(DraftKind::Analogy, self.topic(), &safe)
                .with(params::SOURCE, "create-analogy"),
        )
    }

    pub fn back(&self) -> Location {
        Location::new(SHARED_FEEDBACK_PATH)
            .with(params::TYPE, DraftKind::Explanation.as_str())
            .with(params::TOPIC, self.topic())
    }
}

//=========================================================================================
// Step 6: Review & Summary
//=========================================================================================

pub struct ReviewSummary {
    topic: DraftField,
    explanation: DraftField,
    analogy: DraftField,
    from: Option<String>,
}

impl ReviewSummary {
    pub fn open(store: Arc<dyn DraftStore>, location: &Location) -> Self {
        let topic = mount_topic(&store, location);
        let explanation = DraftField::mount_from(
            store.clone(),
            StoreKey::Explanation,
            location,
            &[params::EXPLANATION, params::EXP],
            DEFAULT_EXPLANATION,
        );
        let analogy = DraftField::mount_from(
            store,
            StoreKey::Analogy,
            location,
            &[params::ANALOGY],
            DEFAULT_ANALOGY,
        );
        Self {
            topic,
            explanation,
            analogy,
            from: location.present_param(params::FROM).map(str::to_string),
        }
    }

    pub fn topic(&self) -> &str {
        self.topic.value()
    }

    pub fn explanation(&self) -> &str {
        self.explanation.value()
    }

    pub fn analogy(&self) -> &str {
        self.analogy.value()
    }

    pub fn export_explanation(&self) -> ExportDocument {
        export::explanation_document(self.topic(), self.explanation())
    }

    pub fn export_analogy(&self) -> ExportDocument {
        export::analogy_document(self.topic(), self.analogy())
    }

    pub fn export_summary(&self) -> ExportDocument {
        export::summary_document(self.topic(), self.explanation(), self.analogy())
    }

    /// Returns to the feedback screen named by `?from=`. `None` means plain
    /// history-back.
    pub fn back(&self) -> Option<Location> {
        match self.from.as_deref() {
            Some("analogy-feedback") => Some(Location::new(ANALOGY_FEEDBACK_PATH)),
            Some("explanation-feedback") => Some(Location::new(EXPLANATION_FEEDBACK_PATH)),
            _ => None,
        }
    }

    pub fn restart(&self) -> Location {
        Location::new(SIMPLE_EXPLANATION_PATH)
    }
}

/// Location of the analogy step, optionally seeded with a draft.
pub fn create_analogy_location(topic: &str, seed: Option<&str>) -> Location {
    let location = Location::new(CREATE_ANALOGY_PATH);
    let location = match seed {
        Some(seed) => location.with(params::SEED, truncate_chars(seed, MAX_URL_DRAFT_CHARS)),
        None => location,
    };
    location.with(params::TOPIC, topic)
}

/// Location of the review step after analogy feedback.
pub fn review_location(topic: &str, analogy: &str) -> Location {
    Location::new(REVIEW_SUMMARY_PATH)
        .with(params::FROM, "analogy-feedback")
        .with(params::TOPIC, topic)
        .with(params::ANALOGY, truncate_chars(analogy, MAX_URL_DRAFT_CHARS))
}
