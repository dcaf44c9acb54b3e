//! crates/feynman_core/src/export.rs
//!
//! Plain-text documents derived from the current drafts for download.

const FILENAME_LIMIT: usize = 60;

/// A named plain-text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub contents: String,
}

/// Turns a topic into a safe filename stem: runs of characters other than
/// ASCII letters, digits, `_` and `-` become one underscore, the result is cut
/// to 60 characters, and an empty stem becomes `export`.
pub fn sanitize_filename(topic: &str) -> String {
    let mut out = String::with_capacity(topic.len());
    let mut in_run = false;
    for c in topic.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    let stem: String = out.chars().take(FILENAME_LIMIT).collect();
    if stem.is_empty() {
        "export".to_string()
    } else {
        stem
    }
}

pub fn explanation_document(topic: &str, explanation: &str) -> ExportDocument {
    ExportDocument {
        filename: format!("{}-explanation.txt", sanitize_filename(topic)),
        contents: explanation.to_string(),
    }
}

pub fn analogy_document(topic: &str, analogy: &str) -> ExportDocument {
    ExportDocument {
        filename: format!("{}-analogy.txt", sanitize_filename(topic)),
        contents: analogy.to_string(),
    }
}

pub fn summary_document(topic: &str, explanation: &str, analogy: &str) -> ExportDocument {
    let contents = [
        format!("Topic: {}", topic),
        String::new(),
        "Your Explanation:".to_string(),
        explanation.to_string(),
        String::new(),
        "Your Analogy:".to_string(),
        analogy.to_string(),
        String::new(),
        "— Generated with the Feynman Technique tutor —".to_string(),
    ]
    .join("\n");
    ExportDocument {
        filename: format!("{}-summary.txt", sanitize_filename(topic)),
        contents,
    }
}
