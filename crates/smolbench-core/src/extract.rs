//! Answer extraction.
//!
//! Locates the delimiter-wrapped answer in raw model output and scores it
//! against the expected answer. Extraction is pure and total: any input
//! string degrades to `is_malformed` rather than an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::prompt::ExpectedAnswer;

/// Predicted answer recorded when no delimiter-wrapped answer was found.
pub const MALFORMED_SENTINEL: &str = "No properly formatted answer found";

/// Absolute tolerance for numeric answer comparison.
const NUMERIC_TOLERANCE: f64 = 0.01;

// Wrapper patterns the synthesized prompts instruct the model to use; keep
// in sync with the instructions in prompt.rs.
static LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<<\s*([A-D])\s*>>").expect("valid letter pattern"));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<\s*([+-]?\d+(?:\.\d+)?)\s*>>").expect("valid number pattern")
});

/// Outcome of extracting an answer from one model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub predicted: String,
    pub is_correct: bool,
    pub is_malformed: bool,
}

/// Extract and score a model response against the expected answer.
pub fn extract(response: &str, expected: &ExpectedAnswer) -> Extraction {
    match expected {
        ExpectedAnswer::Label(label) => extract_label(response, label),
        ExpectedAnswer::Number(number) => extract_number(response, number),
        ExpectedAnswer::Rubric(requirements) => Extraction {
            predicted: response.to_string(),
            is_correct: requirements.iter().all(|r| r.check(response)),
            // Free-form responses are scored by rubric, never as malformed.
            is_malformed: false,
        },
    }
}

fn extract_label(response: &str, expected: &str) -> Extraction {
    match LETTER_RE.captures(response) {
        Some(captures) => {
            let predicted = captures[1].to_ascii_uppercase();
            let is_correct = predicted == expected;
            Extraction {
                predicted,
                is_correct,
                is_malformed: false,
            }
        }
        None => malformed(),
    }
}

fn extract_number(response: &str, expected: &str) -> Extraction {
    let Some(captures) = NUMBER_RE.captures(response) else {
        return malformed();
    };
    let predicted = captures[1].to_string();
    let is_correct = match (predicted.parse::<f64>(), expected.trim().parse::<f64>()) {
        (Ok(p), Ok(e)) => (p - e).abs() < NUMERIC_TOLERANCE,
        // The dataset's expected value failed to parse; the response itself
        // is well-formed, it just cannot be scored correct.
        _ => false,
    };
    Extraction {
        predicted,
        is_correct,
        is_malformed: false,
    }
}

fn malformed() -> Extraction {
    Extraction {
        predicted: MALFORMED_SENTINEL.to_string(),
        is_correct: false,
        is_malformed: true,
    }
}
