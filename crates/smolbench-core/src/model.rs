//! Core data model: benchmark examples and their question formats.
//!
//! Dataset records are untyped by contract; each benchmark subset ships its
//! own field layout, and classification happens per example by structural
//! inspection rather than schema validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record parsed from a benchmark dataset file.
///
/// Wraps the raw JSON value and exposes accessors for the fields observed
/// across the supported benchmark layouts. Examples are immutable and are
/// discarded once scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Example(Value);

impl Example {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn question(&self) -> Option<&str> {
        self.0.get("question").and_then(Value::as_str)
    }

    /// `choices` as a plain ordered sequence of strings (MMLU, TruthfulQA).
    pub fn choice_list(&self) -> Option<Vec<String>> {
        self.0
            .get("choices")?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// `choices.text` for keyed choice layouts (ARC).
    pub fn choice_text_list(&self) -> Option<Vec<String>> {
        self.0
            .get("choices")?
            .get("text")?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn gold_index(&self) -> Option<u64> {
        self.0.get("gold_index").and_then(Value::as_u64)
    }

    pub fn answer_key(&self) -> Option<&str> {
        self.0.get("answerKey").and_then(Value::as_str)
    }

    /// `answer` interpreted as a zero-based choice index.
    pub fn answer_index(&self) -> Option<u64> {
        self.0.get("answer").and_then(Value::as_u64)
    }

    /// `answer` as a string, whether the dataset stores it as a JSON number
    /// or a numeric string (MathQA).
    pub fn answer_text(&self) -> Option<String> {
        match self.0.get("answer") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn equation(&self) -> Option<&str> {
        self.0.get("equation").and_then(Value::as_str)
    }

    /// Pre-built free-form instruction prompt (IFEval-style records).
    pub fn prompt_text(&self) -> Option<&str> {
        self.0.get("prompt").and_then(Value::as_str)
    }

    pub fn instruction_ids(&self) -> Vec<String> {
        self.0
            .get("instruction_id_list")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Per-instruction keyword arguments, parallel to `instruction_id_list`.
    pub fn kwargs_list(&self) -> Vec<Value> {
        self.0
            .get("kwargs")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn subject(&self) -> Option<&str> {
        self.0.get("subject").and_then(Value::as_str)
    }

    fn field_is_truthy(&self, field: &str) -> bool {
        match self.0.get(field) {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(Value::Bool(b)) => *b,
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
            Some(Value::Null) | None => false,
        }
    }
}

/// The closed classification of an example's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionFormat {
    #[serde(rename = "truthfulqa")]
    TruthfulQa,
    #[serde(rename = "arc")]
    Arc,
    #[serde(rename = "mathqa")]
    MathQa,
    #[serde(rename = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "free_form")]
    FreeForm,
}

impl QuestionFormat {
    /// Classify an example by structural inspection.
    ///
    /// The precedence is load-bearing: some records structurally satisfy
    /// more than one check, and the first match wins. Returns `None` for
    /// records matching no known layout; callers must treat that as an
    /// explicit detection failure, never default a branch.
    pub fn detect(example: &Example) -> Option<QuestionFormat> {
        if example.gold_index().is_some() && example.choice_list().is_some() {
            return Some(QuestionFormat::TruthfulQa);
        }
        if example.choice_text_list().is_some() {
            return Some(QuestionFormat::Arc);
        }
        if example.field_is_truthy("answer") && example.field_is_truthy("equation") {
            return Some(QuestionFormat::MathQa);
        }
        if example.choice_list().is_some() && example.answer_index().is_some() {
            return Some(QuestionFormat::MultipleChoice);
        }
        if example.prompt_text().is_some() {
            return Some(QuestionFormat::FreeForm);
        }
        None
    }
}

impl fmt::Display for QuestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionFormat::TruthfulQa => write!(f, "truthfulqa"),
            QuestionFormat::Arc => write!(f, "arc"),
            QuestionFormat::MathQa => write!(f, "mathqa"),
            QuestionFormat::MultipleChoice => write!(f, "multiple_choice"),
            QuestionFormat::FreeForm => write!(f, "free_form"),
        }
    }
}
