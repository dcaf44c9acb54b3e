//! crates/feynman_core/src/retry.rs
//!
//! The retry input of a feedback screen. Applying a submitted revision is the
//! feedback screen's job; this type only guards the input.

/// A revision accepted for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySubmission {
    pub text: String,
}

#[derive(Debug, Default)]
pub struct RetryInput {
    text: String,
    submitting: bool,
}

impl RetryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.text.trim().is_empty()
    }

    /// Enters the submitting state. Blank text or a submission already in
    /// progress makes this a no-op.
    pub fn begin(&mut self) -> Option<RetrySubmission> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        Some(RetrySubmission {
            text: self.text.trim().to_string(),
        })
    }

    /// Leaves the submitting state with an empty input.
    pub fn finish(&mut self) {
        self.text.clear();
        self.submitting = false;
    }
}
