//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use feynman_core::ports::{FeedbackService, FileStore, SubmissionLog};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub feedback: Arc<dyn FeedbackService>,
    pub submissions: Arc<dyn SubmissionLog>,
    pub files: Arc<dyn FileStore>,
}
