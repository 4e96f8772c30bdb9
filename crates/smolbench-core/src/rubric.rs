//! Free-form response requirements.
//!
//! IFEval-style records carry no single-token answer; correctness is the
//! conjunction of per-instruction predicates checked against the raw
//! response text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Example;

/// One verifiable requirement derived from an `(instruction_id, kwargs)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// Every keyword must appear in the response (case-insensitive).
    IncludeKeywords(Vec<String>),
    /// None of the words may appear in the response (case-insensitive).
    ForbidWords(Vec<String>),
    /// The response must equal its own uppercasing.
    AllCapital,
    /// The response must equal its own lowercasing.
    AllLowercase,
    /// The trimmed response must be wrapped in double quotes.
    WrappedInQuotes,
}

impl Requirement {
    /// Build a requirement from an instruction id and its kwargs.
    ///
    /// Returns `None` for instruction ids outside the supported set; the
    /// caller decides how to treat those.
    pub fn from_instruction(id: &str, kwargs: &Value) -> Option<Requirement> {
        match id {
            "keywords:existence" => Some(Requirement::IncludeKeywords(string_list(
                kwargs, "keywords", "keyword",
            ))),
            "keywords:forbidden_words" => Some(Requirement::ForbidWords(string_list(
                kwargs,
                "forbidden_words",
                "forbidden_word",
            ))),
            "change_case:english_capital" => Some(Requirement::AllCapital),
            "change_case:english_lowercase" => Some(Requirement::AllLowercase),
            "startend:quotation" => Some(Requirement::WrappedInQuotes),
            _ => None,
        }
    }

    /// Check the requirement against a raw response. Pure and total.
    pub fn check(&self, response: &str) -> bool {
        match self {
            Requirement::IncludeKeywords(words) => {
                let lowered = response.to_lowercase();
                words.iter().all(|w| lowered.contains(&w.to_lowercase()))
            }
            Requirement::ForbidWords(words) => {
                let lowered = response.to_lowercase();
                !words.iter().any(|w| lowered.contains(&w.to_lowercase()))
            }
            Requirement::AllCapital => response == response.to_uppercase(),
            Requirement::AllLowercase => response == response.to_lowercase(),
            Requirement::WrappedInQuotes => {
                let trimmed = response.trim();
                trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"')
            }
        }
    }

    /// Human-readable form used in evaluation log entries.
    pub fn describe(&self) -> String {
        match self {
            Requirement::IncludeKeywords(words) => {
                format!("must include {}", quoted_join(words))
            }
            Requirement::ForbidWords(words) => {
                format!("must not include any of {}", quoted_join(words))
            }
            Requirement::AllCapital => "must be entirely capitalized".to_string(),
            Requirement::AllLowercase => "must be entirely lowercase".to_string(),
            Requirement::WrappedInQuotes => "must be wrapped in double quotes".to_string(),
        }
    }
}

/// Build the requirement list for a free-form example.
///
/// `kwargs` entries are positional, parallel to `instruction_id_list`; a
/// missing entry is treated as empty. Unknown instruction ids are skipped
/// with a warning rather than failing the example.
pub fn requirements_for(example: &Example) -> Vec<Requirement> {
    let kwargs = example.kwargs_list();
    example
        .instruction_ids()
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let args = kwargs.get(i).cloned().unwrap_or(Value::Null);
            let requirement = Requirement::from_instruction(id, &args);
            if requirement.is_none() {
                tracing::warn!(instruction = %id, "unsupported instruction id, skipping");
            }
            requirement
        })
        .collect()
}

fn string_list(kwargs: &Value, plural: &str, singular: &str) -> Vec<String> {
    if let Some(words) = kwargs.get(plural).and_then(Value::as_array) {
        return words
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
    }
    kwargs
        .get(singular)
        .and_then(Value::as_str)
        .map(|w| vec![w.to_string()])
        .unwrap_or_default()
}

fn quoted_join(words: &[String]) -> String {
    words
        .iter()
        .map(|w| format!("\"{w}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
