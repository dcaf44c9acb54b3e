pub mod feedback_llm;
pub mod memory;

pub use feedback_llm::OpenAiFeedbackAdapter;
pub use memory::{InMemoryFileStore, InMemorySubmissionLog};
