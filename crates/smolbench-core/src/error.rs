//! Evaluation error taxonomy.
//!
//! Defined in `smolbench-core` so the evaluation driver can classify errors
//! without string matching: dataset-level failures abort a run, while a
//! single unrecognizable example is absorbed into the malformed count.

use thiserror::Error;

/// Errors that can occur while running an evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The dataset resource could not be retrieved.
    #[error("failed to fetch dataset: {reason}")]
    DatasetUnavailable { reason: String },

    /// One line of the dataset is not valid JSON.
    #[error("dataset line {line_no} is not valid JSON: {reason}")]
    DatasetLine { line_no: usize, reason: String },

    /// An example matches none of the known question formats.
    #[error("example matches no known question format")]
    UnsupportedExample,

    /// The model backend is unreachable or does not serve the model.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A generation request failed.
    #[error("text generation failed: {0}")]
    Generation(String),
}

impl EvalError {
    /// Returns `true` if this error aborts the whole run.
    ///
    /// Only `UnsupportedExample` is recoverable: the driver counts the
    /// example as malformed and continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EvalError::UnsupportedExample)
    }
}
