#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! End-to-end review of a code snippet: prompt, provider call, normalization
//! and grading.
//!
//! [`CodeEvaluator::evaluate`] is total. Every outcome, including provider
//! outages and malformed replies, becomes an [`EvaluationResult`] with the same
//! shape, so the HTTP layer only ever serializes.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::ProviderConfig,
    grade::Grade,
    normalize::html_to_text,
    prompt::{build_prompt, system_message},
    provider::{ProviderError, ReviewClient},
};

/// Review shown when the provider could not be reached or answered with an
/// error status.
pub const TRANSPORT_FAILURE_REVIEW: &str =
    "API request failed. Please check your connection or try again later.";

/// Review shown when the provider answered without a review.
pub const NO_EVALUATION_REVIEW: &str = "Failed to evaluate code. Please try again later.";

/// Review shown for anything else that went wrong.
pub const UNEXPECTED_FAILURE_REVIEW: &str = "An unexpected error occurred. Please try again later.";

/// Inbound review request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationRequest {
    /// The snippet to review.
    #[serde(default)]
    pub code:     Option<String>,
    /// Language tag; detected from the code when blank.
    #[serde(default)]
    pub language: Option<String>,
    /// Problem statement the code is meant to solve.
    #[serde(default)]
    pub question: Option<String>,
}

impl EvaluationRequest {
    /// Returns the code to review, or `None` when it is missing or blank.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.trim().is_empty())
    }
}

/// Whether an evaluation produced a review. Kept for frontend compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// A review was produced.
    Success,
    /// No review was produced.
    Error,
}

/// The response for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether a review was produced.
    pub success:    bool,
    /// Normalized review text; only present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<String>,
    /// Grade out of ten; `0` on failure.
    pub grade:      f64,
    /// Mirror of `success` as a string.
    pub result:     Outcome,
    /// Text to show the user: the review on success, a generic message on
    /// failure.
    pub review:     String,
    /// What went wrong, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:      Option<String>,
}

impl EvaluationResult {
    /// A successful evaluation with the given normalized review.
    pub fn success(review: String, grade: Grade) -> Self {
        Self {
            success:    true,
            evaluation: Some(review.clone()),
            grade:      grade.value,
            result:     Outcome::Success,
            review,
            error:      None,
        }
    }

    /// The single failure shape; every failure path goes through here.
    pub fn failure(error: impl Into<String>, review: impl Into<String>) -> Self {
        Self {
            success:    false,
            evaluation: None,
            grade:      0.0,
            result:     Outcome::Error,
            review:     review.into(),
            error:      Some(error.into()),
        }
    }

    /// The request carried no code.
    pub fn missing_code() -> Self {
        Self::failure("No code provided", "No code provided for evaluation")
    }

    /// The request body was not a JSON object of the expected shape.
    pub fn invalid_request() -> Self {
        Self::failure(
            "Invalid request body",
            "Request body must be a JSON object with a `code` field",
        )
    }

    /// Something went wrong that has no more specific description.
    pub fn unexpected() -> Self {
        Self::failure("Unexpected error during evaluation", UNEXPECTED_FAILURE_REVIEW)
    }
}

impl From<&ProviderError> for EvaluationResult {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Transport(_) => {
                Self::failure("API request failed", TRANSPORT_FAILURE_REVIEW)
            }
            ProviderError::InvalidBody(_) => Self::failure(
                "API request failed: unreadable response from provider",
                TRANSPORT_FAILURE_REVIEW,
            ),
            ProviderError::Status { status, detail } => {
                let error = match detail {
                    Some(detail) => format!("API request failed with status {status}: {detail}"),
                    None => format!("API request failed with status {status}"),
                };
                Self::failure(error, TRANSPORT_FAILURE_REVIEW)
            }
            ProviderError::NoChoices { payload } => Self::failure(
                format!("No evaluation returned from API: {payload}"),
                NO_EVALUATION_REVIEW,
            ),
            ProviderError::MissingContent => Self::unexpected(),
        }
    }
}

/// Reviews code snippets through the configured provider.
///
/// Holds only immutable configuration and a pooled HTTP client, so a single
/// instance can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct CodeEvaluator {
    /// Outbound provider client.
    client: ReviewClient,
}

impl CodeEvaluator {
    /// Creates an evaluator for the given provider.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: ReviewClient::new(config)?,
        })
    }

    /// Reviews `code` and grades it.
    ///
    /// The grade is read from the raw review; the review returned to the caller
    /// is the normalized text.
    pub async fn evaluate(
        &self,
        code: &str,
        language: Option<&str>,
        question: Option<&str>,
    ) -> EvaluationResult {
        let span = tracing::info_span!("evaluation", id = %Uuid::new_v4());

        async move {
            let prompt = build_prompt(code, language, question);

            match self.client.review(system_message(), &prompt).await {
                Ok(raw) => {
                    let grade = Grade::from_review(&raw);
                    tracing::info!(%grade, source = ?grade.source, "Review graded");
                    EvaluationResult::success(html_to_text(&raw), grade)
                }
                Err(err) => {
                    tracing::error!(error = ?err, "Evaluation failed: {err}");
                    EvaluationResult::from(&err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failure_shape_is_uniform() {
        let value = serde_json::to_value(EvaluationResult::missing_code()).expect("serialize");

        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "No code provided",
                "grade": 0.0,
                "result": "error",
                "review": "No code provided for evaluation",
            })
        );
    }

    #[test]
    fn success_mirrors_review_into_evaluation() {
        let grade = Grade::from_review("Final Grade: 9/10");
        let value = serde_json::to_value(EvaluationResult::success("Fine.".into(), grade))
            .expect("serialize");

        assert_eq!(value["success"], true);
        assert_eq!(value["evaluation"], "Fine.");
        assert_eq!(value["review"], "Fine.");
        assert_eq!(value["result"], "success");
        assert_eq!(value["grade"], 9.0);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn blank_code_counts_as_missing() {
        let request: EvaluationRequest =
            serde_json::from_value(json!({"code": "  \n", "language": "python"}))
                .expect("deserialize");
        assert_eq!(request.code(), None);

        let request: EvaluationRequest = serde_json::from_value(json!({})).expect("deserialize");
        assert_eq!(request.code(), None);

        let request: EvaluationRequest =
            serde_json::from_value(json!({"code": "x = 1", "extra": true})).expect("deserialize");
        assert_eq!(request.code(), Some("x = 1"));
    }

    #[test]
    fn no_choices_error_includes_payload() {
        let err = ProviderError::NoChoices {
            payload: json!({"choices": []}),
        };
        let result = EvaluationResult::from(&err);

        assert_eq!(result.error.as_deref(), Some(r#"No evaluation returned from API: {"choices":[]}"#));
        assert_eq!(result.review, NO_EVALUATION_REVIEW);
        assert_eq!(result.grade, 0.0);
    }

    #[test]
    fn missing_content_is_unexpected() {
        let result = EvaluationResult::from(&ProviderError::MissingContent);
        assert_eq!(result.review, UNEXPECTED_FAILURE_REVIEW);
        assert!(!result.success);
    }
}
