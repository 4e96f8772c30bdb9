//! Scoring accumulator and metrics snapshots.
//!
//! The accumulator is owned by the evaluation driver for the duration of one
//! run; a full snapshot (including the log of every example scored so far)
//! is derived after each example for progress reporting.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::model::QuestionFormat;

/// Token accounting collaborator: `(prompt, response) -> token estimate`.
pub type TokenEstimator = Arc<dyn Fn(&str, &str) -> u64 + Send + Sync>;

/// Host memory collaborator: current process memory in bytes, 0 if unknown.
pub type MemoryReader = Arc<dyn Fn() -> u64 + Send + Sync>;

/// The historical character-count heuristic: four characters per token.
///
/// Deliberately not a real tokenizer; exported metrics must stay numerically
/// comparable with prior runs.
pub fn chars_per_token_estimator() -> TokenEstimator {
    Arc::new(|prompt, response| ((prompt.len() + response.len()) / 4) as u64)
}

/// Memory reader used when the host exposes nothing.
pub fn zero_memory_reader() -> MemoryReader {
    Arc::new(|| 0)
}

/// The full trace of one evaluated example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalLogEntry {
    /// Zero-based position in the dataset.
    pub index: usize,
    /// Detected format; `None` when the example matched no known shape.
    pub format: Option<QuestionFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub prompt: String,
    pub predicted: String,
    pub expected: String,
    pub is_correct: bool,
    pub is_malformed: bool,
    /// Wall-clock time of the generate call for this example.
    pub generation_ms: u64,
    /// Token estimate charged for this example.
    pub tokens: u64,
}

/// Point-in-time aggregate of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Token throughput in tokens per second.
    pub latency: f64,
    pub accuracy: f64,
    pub tokens_processed: u64,
    pub memory_usage_bytes: u64,
    pub eval_time_secs: f64,
    pub malformed_responses: u64,
    pub logs: Vec<EvalLogEntry>,
}

/// Running counts for one evaluation run.
pub struct ScoreAccumulator {
    correct: u64,
    total: u64,
    tokens: u64,
    malformed: u64,
    started: Instant,
    logs: Vec<EvalLogEntry>,
    memory: MemoryReader,
}

impl ScoreAccumulator {
    pub fn new(memory: MemoryReader) -> Self {
        Self {
            correct: 0,
            total: 0,
            tokens: 0,
            malformed: 0,
            started: Instant::now(),
            logs: Vec::new(),
            memory,
        }
    }

    /// Record one scored example and append its log entry.
    pub fn record(&mut self, entry: EvalLogEntry) {
        self.total += 1;
        if entry.is_correct {
            self.correct += 1;
        }
        if entry.is_malformed {
            self.malformed += 1;
        }
        self.tokens += entry.tokens;
        self.logs.push(entry);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Derive a full snapshot from the running totals.
    ///
    /// Accuracy and latency are guarded to 0.0 rather than NaN when nothing
    /// has been processed yet.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let latency = if elapsed_ms == 0 {
            0.0
        } else {
            self.tokens as f64 * 1000.0 / elapsed_ms as f64
        };
        let accuracy = if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        };
        MetricsSnapshot {
            latency,
            accuracy,
            tokens_processed: self.tokens,
            memory_usage_bytes: (self.memory)(),
            eval_time_secs: elapsed_ms as f64 / 1000.0,
            malformed_responses: self.malformed,
            logs: self.logs.clone(),
        }
    }
}
