//! Review skill loading and prompt composition.
//!
//! Provides the policy/reference store, language and framework detection
//! over a change set, and assembly of the final review instruction document.

pub mod context;
pub mod prompt;
pub mod store;

pub use context::ReviewContext;
pub use prompt::AssembledPrompt;
pub use store::{PolicyStore, SkillDir};
