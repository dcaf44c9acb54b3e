//! services/api/src/lib.rs
//!
//! The evaluation service: an HTTP proxy between the Feynman wizard and an
//! OpenAI-compatible model.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
