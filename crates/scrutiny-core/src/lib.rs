//! Core types, configuration, and error handling for Scrutiny.
//!
//! This crate provides the shared foundation used by the other Scrutiny
//! crates:
//! - [`ScrutinyError`] — unified error type using `thiserror`
//! - [`Config`] — immutable process configuration built from environment
//!   variables
//! - Shared types: [`ChangeRecord`], [`ChangeEntry`], [`ChangeKind`],
//!   [`Severity`], [`Finding`], [`Annotation`]

mod config;
mod error;
mod types;

pub use config::Config;
pub use error::ScrutinyError;
pub use types::{Annotation, ChangeEntry, ChangeKind, ChangeRecord, Finding, Severity};

/// A convenience `Result` type for Scrutiny operations.
pub type Result<T> = std::result::Result<T, ScrutinyError>;
