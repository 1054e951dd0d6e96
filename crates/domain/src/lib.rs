//! # Leadflow Domain
//!
//! Business domain types and models for the calendar meeting-ingestion
//! pipeline.
//!
//! This crate contains:
//! - Domain error type and `Result` alias
//! - Credential and meeting-lead records, provider event boundary types
//! - Configuration structures and constants
//! - The meeting title classifier
//!
//! ## Architecture
//! - No dependencies on other Leadflow crates
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export classifier utilities
pub use utils::title_classifier::{classify_event_title, TitleClassification};
