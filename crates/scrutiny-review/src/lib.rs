//! Review pipeline orchestration for Azure DevOps pull requests.
//!
//! Provides the full review flow: change filtering, the Azure DevOps and
//! LLM collaborators, review invocation, finding extraction, annotation
//! mapping, and the sequential pipeline that ties them together.

pub mod annotate;
pub mod azure;
pub mod extract;
pub mod filter;
pub mod invoke;
pub mod llm;
pub mod pipeline;
