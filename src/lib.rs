//! # codearena
//!
//! An HTTP service that reviews code snippets with a large language model and
//! turns the review into a grade out of ten.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Provider and server configuration read from the environment
pub mod config;
/// End-to-end evaluation of a snippet and the response shape
pub mod evaluator;
/// Grade extraction and the keyword fallback
pub mod grade;
/// Best-effort language detection
pub mod language;
/// HTML to Markdown-ish text conversion for reviews
pub mod normalize;
/// Review prompt templates
pub mod prompt;
/// Chat-completion client for the review provider
pub mod provider;
/// HTTP routes and serving
pub mod server;

pub use config::{ProviderConfig, ServerConfig};
pub use evaluator::{CodeEvaluator, EvaluationRequest, EvaluationResult, Outcome};
pub use grade::{Grade, GradeSource};
