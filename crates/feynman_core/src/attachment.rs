//! crates/feynman_core/src/attachment.rs
//!
//! Optional file context. At most one attachment is active per session; a new
//! upload replaces the previous one.

use uuid::Uuid;

use crate::domain::FileContext;
use crate::ports::DraftStore;
use crate::store::{self, StoreKey};

/// PDFs larger than this are referenced by name only.
pub const DEFAULT_MAX_INLINE_BYTES: usize = 1_000_000;

/// Request header naming an upload the evaluation service already holds.
pub const FILE_ID_HEADER: &str = "x-file-id";

const TEXT_EXTENSIONS: [&str; 3] = [".txt", ".md", ".csv"];

pub fn is_pdf(name: &str, mime: Option<&str>) -> bool {
    mime == Some("application/pdf") || name.to_ascii_lowercase().ends_with(".pdf")
}

pub fn is_text(name: &str, mime: Option<&str>) -> bool {
    let lower = name.to_ascii_lowercase();
    mime.is_some_and(|m| m.starts_with("text/"))
        || TEXT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Reduces an upload to the text the evaluator can use.
///
/// Text files are always decoded as UTF-8 (lossy), whatever their size.
/// Other binaries keep an empty content, as does a PDF over `max_inline` bytes.
pub fn extract(name: &str, mime: Option<&str>, bytes: &[u8], max_inline: usize) -> FileContext {
    let oversized_pdf = is_pdf(name, mime) && bytes.len() > max_inline;
    let content = if oversized_pdf || !is_text(name, mime) {
        String::new()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };
    FileContext::new(name, content)
}

/// The active attachment, if one has been stored.
pub fn current(store: &dyn DraftStore) -> Option<FileContext> {
    let name = store::load(store, StoreKey::FileName)?;
    let content = store::load(store, StoreKey::FileContent).unwrap_or_default();
    let file_id = store::load(store, StoreKey::FileId).and_then(|raw| Uuid::parse_str(&raw).ok());
    Some(FileContext {
        name,
        content,
        file_id,
    })
}

/// Makes `context` the active attachment. An id left by an earlier upload is
/// dropped when the new attachment has none.
pub fn attach(store: &dyn DraftStore, context: &FileContext) {
    store::save(store, StoreKey::FileName, &context.name);
    store::save(store, StoreKey::FileContent, &context.content);
    match context.file_id {
        Some(id) => store::save(store, StoreKey::FileId, &id.to_string()),
        None => store::forget(store, StoreKey::FileId),
    }
}

pub fn remove(store: &dyn DraftStore) {
    store::forget(store, StoreKey::FileName);
    store::forget(store, StoreKey::FileContent);
    store::forget(store, StoreKey::FileId);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDraftStore;

    #[test]
    fn text_files_are_inlined() {
        let ctx = extract("notes.md", None, b"# Ohm\nV = IR", DEFAULT_MAX_INLINE_BYTES);
        assert_eq!(ctx.content, "# Ohm\nV = IR");
    }

    #[test]
    fn oversized_pdf_is_name_only() {
        let bytes = vec![0u8; DEFAULT_MAX_INLINE_BYTES + 1];
        let ctx = extract("lecture.PDF", Some("application/pdf"), &bytes, DEFAULT_MAX_INLINE_BYTES);
        assert!(is_pdf("lecture.PDF", None));
        assert_eq!(ctx.name, "lecture.PDF");
        assert_eq!(ctx.content, "");
    }

    #[test]
    fn oversized_text_file_keeps_its_content() {
        let bytes = vec![b'a'; DEFAULT_MAX_INLINE_BYTES + 1];
        let ctx = extract("notes.txt", Some("text/plain"), &bytes, DEFAULT_MAX_INLINE_BYTES);
        assert_eq!(ctx.content.len(), DEFAULT_MAX_INLINE_BYTES + 1);
    }

    #[test]
    fn small_binary_is_name_only() {
        let ctx = extract("diagram.png", Some("image/png"), &[0x89, b'P', b'N', b'G'], 1024);
        assert_eq!(ctx.content, "");
    }

    #[test]
    fn last_upload_wins_and_remove_clears() {
        let store = MemoryDraftStore::new();
        attach(&store, &FileContext::new("a.txt", "a"));
        attach(&store, &FileContext::new("b.txt", "b"));
        assert_eq!(current(&store).unwrap().name, "b.txt");

        remove(&store);
        assert_eq!(current(&store), None);
    }

    #[test]
    fn file_id_is_kept_with_the_attachment() {
        let store = MemoryDraftStore::new();
        let id = Uuid::new_v4();
        attach(&store, &FileContext::new("slides.pdf", "").with_file_id(id));
        assert_eq!(current(&store).unwrap().file_id, Some(id));
        assert_eq!(
            store::load(&store, StoreKey::FileId),
            Some(id.to_string())
        );

        attach(&store, &FileContext::new("notes.txt", "V = IR"));
        assert_eq!(current(&store).unwrap().file_id, None);

        attach(&store, &FileContext::new("slides.pdf", "").with_file_id(id));
        remove(&store);
        assert_eq!(store::load(&store, StoreKey::FileId), None);
    }
}
