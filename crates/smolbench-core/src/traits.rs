//! Trait definitions for the driver's external collaborators.
//!
//! These async traits are implemented by the `smolbench-providers` and
//! `smolbench-datasets` crates respectively; the driver treats both as
//! black boxes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::model::Example;

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

/// A text-generation backend under evaluation.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier (e.g. "smollm2:135m").
    fn name(&self) -> &str;

    /// Warm the model so the first generate call does not pay load time.
    ///
    /// Must be safe to call repeatedly and from concurrent tasks; the
    /// backend performs the actual load at most once per instance.
    async fn ensure_loaded(&self) -> Result<(), EvalError>;

    /// Generate a completion for a prompt.
    async fn generate(&self, prompt: &str, options: &GenerationOptions)
        -> Result<String, EvalError>;

    /// List the models this backend currently serves.
    async fn available_models(&self) -> Result<Vec<ModelInfo>, EvalError>;
}

/// Knobs forwarded to the backend per generate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature; 0.0 for deterministic scoring runs.
    pub temperature: f64,
    /// Stop sequences.
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 0.0,
            stop_sequences: Vec::new(),
        }
    }
}

/// Information about a model a backend serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// On-disk size in bytes, if reported.
    #[serde(default)]
    pub size_bytes: Option<u64>,
    /// Parameter count description (e.g. "135M"), if reported.
    #[serde(default)]
    pub parameter_size: Option<String>,
}

// ---------------------------------------------------------------------------
// Dataset source
// ---------------------------------------------------------------------------

/// An ordered sequence of benchmark examples, read in full per call.
///
/// Implementations do not cache or retry; restartability is "call `read`
/// again".
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Stable identifier used in logs and reports.
    fn id(&self) -> &str;

    /// Fetch and parse the whole dataset.
    async fn read(&self) -> Result<Vec<Example>, EvalError>;
}
