#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Review prompts sent to the provider.
//!
//! Templates live next to this module as Markdown and are embedded at compile
//! time, so the prompt for a given `(code, language, question)` is fully
//! determined by the binary.

use crate::language::detect_language;

/// System message sent ahead of every review prompt.
pub fn system_message() -> &'static str {
    include_str!("prompts/system.md").trim_end()
}

/// Returns the requested language, or a detected one when the request left it
/// blank.
pub fn resolve_language<'a>(code: &str, language: Option<&'a str>) -> &'a str {
    match language.map(str::trim) {
        Some(language) if !language.is_empty() => language,
        _ => detect_language(code),
    }
}

/// Builds the user prompt asking for a structured review that ends in a
/// parsable `Final Grade: X/10` line.
///
/// A blank `question` is treated as absent and selects the template without a
/// PROBLEM section.
pub fn build_prompt(code: &str, language: Option<&str>, question: Option<&str>) -> String {
    let language = resolve_language(code, language);

    match question.filter(|q| !q.trim().is_empty()) {
        Some(question) => format!(
            include_str!("prompts/review_with_problem.md"),
            language = language,
            question = question,
            code = code,
        ),
        None => format!(include_str!("prompts/review.md"), language = language, code = code),
    }
}
