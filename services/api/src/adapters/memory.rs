//! services/api/src/adapters/memory.rs
//!
//! In-process implementations of the `SubmissionLog` and `FileStore` ports.
//! Nothing here survives a restart.

use async_trait::async_trait;
use feynman_core::domain::{DraftKind, FileContext, StoredFile, Submission};
use feynman_core::ports::{FileStore, PortError, PortResult, SubmissionLog};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

//=========================================================================================
// Submission Log
//=========================================================================================

#[derive(Default)]
pub struct InMemorySubmissionLog {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemorySubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionLog for InMemorySubmissionLog {
    async fn record(&self, submission: Submission) -> PortResult<()> {
        self.submissions.write().await.push(submission);
        Ok(())
    }

    /// Newest first.
    async fn list(&self, kind: DraftKind) -> PortResult<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .iter()
            .rev()
            .filter(|s| s.kind == kind)
            .cloned()
            .collect())
    }
}

//=========================================================================================
// File Store
//=========================================================================================

#[derive(Default)]
pub struct InMemoryFileStore {
    files: RwLock<HashMap<Uuid, StoredFile>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn save(&self, context: FileContext, size: usize) -> PortResult<StoredFile> {
        let id = Uuid::new_v4();
        let stored = StoredFile {
            id,
            size,
            context: context.with_file_id(id),
        };
        self.files.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, file_id: Uuid) -> PortResult<StoredFile> {
        self.files
            .read()
            .await
            .get(&file_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("File {} not found", file_id)))
    }
}
