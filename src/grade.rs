#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, sync::LazyLock};

use regex::{Regex, RegexBuilder};

/// Highest grade a review can receive.
pub const MAX_GRADE: f64 = 10.0;

// Keyword heuristic values are in hundredths of a point.

/// Grade assumed before any keyword adjustments.
const HEURISTIC_BASELINE: u64 = 700;

/// Lowest grade the keyword heuristic can produce.
const HEURISTIC_FLOOR: u64 = 100;

/// Highest grade the keyword heuristic can produce.
const HEURISTIC_CEILING: u64 = 1000;

/// Added per positive phrase.
const POSITIVE_STEP: u64 = 20;

/// Cap on the total positive adjustment.
const POSITIVE_CAP: u64 = 250;

/// Subtracted per negative phrase.
const NEGATIVE_STEP: u64 = 25;

/// Cap on the total negative adjustment.
const NEGATIVE_CAP: u64 = 400;

/// Phrases that nudge the heuristic grade up.
const POSITIVE_INDICATORS: [&str; 9] = [
    "excellent",
    "great",
    "well structured",
    "efficient",
    "clean",
    "maintainable",
    "good practice",
    "best practice",
    "well organized",
];

/// Phrases that nudge the heuristic grade down.
const NEGATIVE_INDICATORS: [&str; 13] = [
    "error",
    "bug",
    "issue",
    "inefficient",
    "confusing",
    "poor",
    "bad practice",
    "fix",
    "problem",
    "security vulnerability",
    "missing",
    "redundant",
    "unnecessary",
];

/// Grade patterns, most specific label first. The bare `N/10` fallback must
/// stay last.
static GRADE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Final Grade:\s*(\d+(?:\.\d+)?)/10",
        r"Grade:\s*(\d+(?:\.\d+)?)/10",
        r"Overall Grade:\s*(\d+(?:\.\d+)?)/10",
        r"Score:\s*(\d+(?:\.\d+)?)/10",
        r"Rating:\s*(\d+(?:\.\d+)?)/10",
        r"grade of (\d+(?:\.\d+)?)/10",
        r"grade: (\d+(?:\.\d+)?)/10",
        r"(\d+(?:\.\d+)?)/10",
    ]
    .into_iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("grade patterns are valid")
    })
    .collect()
});

/// How a grade was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeSource {
    /// The review stated the grade explicitly.
    Stated,
    /// No grade was stated; it was estimated from the review's wording.
    Estimated,
}

/// A review grade out of ten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    /// The grade, in `[0, 10]` with one decimal.
    pub value:  f64,
    /// Where the grade came from.
    pub source: GradeSource,
}

impl Grade {
    /// Derives a grade from review text: the stated grade when there is one,
    /// otherwise the keyword estimate.
    pub fn from_review(review: &str) -> Self {
        match extract_grade(review) {
            Some(value) => Self {
                value,
                source: GradeSource::Stated,
            },
            None => Self {
                value:  heuristic_grade(review),
                source: GradeSource::Estimated,
            },
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}/{:.0}", self.value, MAX_GRADE)
    }
}

/// Rounds to one decimal place, ties to even on the value scaled by ten.
///
/// `5.75` becomes `5.8` and `6.25` becomes `6.2`.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Pulls an explicit `N/10` grade out of review text.
///
/// Labelled patterns ("Final Grade:", "Score:", ...) are tried in priority
/// order before a bare `N/10`; the first pattern that yields a number wins,
/// regardless of where in the text it appears. The value is clamped to
/// `[0, 10]` and rounded with [`round_to_tenth`].
pub fn extract_grade(review: &str) -> Option<f64> {
    GRADE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(review)
            .and_then(|caps| caps.get(1))
            .and_then(|number| number.as_str().parse::<f64>().ok())
            .map(|grade| round_to_tenth(grade.clamp(0.0, MAX_GRADE)))
    })
}

/// Estimates a grade from the review's wording.
///
/// Starts at 7.0, adds 0.2 per positive phrase (at most 2.5) and subtracts
/// 0.25 per negative phrase (at most 4.0). Phrases are counted as
/// case-insensitive substrings, so "inefficient" counts once for each list.
/// The sum is exact and rounds to one decimal with ties to even, so 5.95
/// becomes 6.0 and 6.45 becomes 6.4.
pub fn heuristic_grade(review: &str) -> f64 {
    let review = review.to_lowercase();
    let count = |phrases: &[&str]| -> u64 {
        phrases
            .iter()
            .map(|phrase| review.matches(phrase).count() as u64)
            .sum()
    };

    let positive = count(&POSITIVE_INDICATORS[..])
        .saturating_mul(POSITIVE_STEP)
        .min(POSITIVE_CAP);
    let negative = count(&NEGATIVE_INDICATORS[..])
        .saturating_mul(NEGATIVE_STEP)
        .min(NEGATIVE_CAP);

    let hundredths = (HEURISTIC_BASELINE + positive - negative)
        .clamp(HEURISTIC_FLOOR, HEURISTIC_CEILING);
    hundredths_to_tenths(hundredths)
}

/// Rounds a grade held in hundredths to one decimal, ties to even.
fn hundredths_to_tenths(hundredths: u64) -> f64 {
    let mut tenths = hundredths / 10;
    let rest = hundredths % 10;
    if rest > 5 || (rest == 5 && tenths % 2 == 1) {
        tenths += 1;
    }
    tenths as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_grade_label_is_extracted() {
        assert_eq!(extract_grade("Solid work.\nFinal Grade: 8.5/10"), Some(8.5));
        assert_eq!(extract_grade("final grade: 4/10"), Some(4.0));
    }

    #[test]
    fn other_labels_are_extracted() {
        assert_eq!(extract_grade("Overall this is fine. Score: 6/10"), Some(6.0));
        assert_eq!(extract_grade("Rating: 3/10"), Some(3.0));
        assert_eq!(extract_grade("I would give it a grade of 7/10."), Some(7.0));
        assert_eq!(extract_grade("Roughly 7.5/10 overall."), Some(7.5));
    }

    #[test]
    fn label_priority_beats_position() {
        let review = "Score: 3/10 for style.\n...\nFinal Grade: 8/10";
        assert_eq!(extract_grade(review), Some(8.0));
    }

    #[test]
    fn unparseable_number_falls_through_to_next_pattern() {
        // `\d` also matches non-ASCII digits, which `f64` refuses to parse.
        assert_eq!(extract_grade("Final Grade: \u{0668}/10. Score: 6/10"), Some(6.0));
    }

    #[test]
    fn missing_grade_is_none() {
        assert_eq!(extract_grade("Nice and tidy, nothing to add."), None);
    }

    #[test]
    fn stated_grade_is_clamped_and_rounded() {
        assert_eq!(extract_grade("Final Grade: 12/10"), Some(10.0));
        assert_eq!(extract_grade("Final Grade: 8.25/10"), Some(8.2));
    }

    #[test]
    fn three_positive_phrases_add_point_six() {
        let review = "Excellent naming, clean layout and maintainable overall.";
        assert_eq!(heuristic_grade(review), 7.6);
    }

    #[test]
    fn five_negative_phrases_round_up_to_even() {
        assert_eq!(heuristic_grade("bug bug bug bug bug"), 5.8);
    }

    #[test]
    fn three_negative_phrases_round_down_to_even() {
        assert_eq!(heuristic_grade("A bug, an issue and a problem."), 6.2);
    }

    #[test]
    fn mixed_phrases_round_exact_decimal_ties_to_even() {
        let review = format!("{}{}", "clean ".repeat(6), "bug ".repeat(9));
        assert_eq!(heuristic_grade(&review), 6.0);

        let review = format!("{}{}", "clean ".repeat(1), "bug ".repeat(3));
        assert_eq!(heuristic_grade(&review), 6.4);

        let review = format!("{}{}", "clean ".repeat(9), "bug ".repeat(11));
        assert_eq!(heuristic_grade(&review), 6.0);
    }

    #[test]
    fn hundredths_round_to_even_tenth() {
        assert_eq!(hundredths_to_tenths(495), 5.0);
        assert_eq!(hundredths_to_tenths(505), 5.0);
        assert_eq!(hundredths_to_tenths(575), 5.8);
        assert_eq!(hundredths_to_tenths(576), 5.8);
        assert_eq!(hundredths_to_tenths(1000), 10.0);
    }

    #[test]
    fn adjustments_are_capped() {
        assert_eq!(heuristic_grade(&"great ".repeat(40)), 9.5);
        assert_eq!(heuristic_grade(&"bug ".repeat(40)), 3.0);
    }

    #[test]
    fn neutral_text_keeps_baseline() {
        assert_eq!(heuristic_grade("It prints hello."), 7.0);
    }

    #[test]
    fn grade_from_review_reports_its_source() {
        let stated = Grade::from_review("Looks good. Final Grade: 9/10");
        assert_eq!(stated.value, 9.0);
        assert_eq!(stated.source, GradeSource::Stated);
        assert_eq!(stated.to_string(), "9.0/10");

        let estimated = Grade::from_review("Clean code.");
        assert_eq!(estimated.value, 7.2);
        assert_eq!(estimated.source, GradeSource::Estimated);
    }
}
