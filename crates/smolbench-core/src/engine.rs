//! The evaluation driver.
//!
//! Drives one dataset through a model strictly sequentially: example *i*'s
//! prompt is never issued before example *i-1* has been scored. The only
//! suspension points are the dataset read and the per-example generate call.
//! There is no retry and no cancellation primitive; a run proceeds to
//! completion or to its first fatal error.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::EvalError;
use crate::extract::{self, MALFORMED_SENTINEL};
use crate::metrics::{
    chars_per_token_estimator, zero_memory_reader, EvalLogEntry, MemoryReader, MetricsSnapshot,
    ScoreAccumulator, TokenEstimator,
};
use crate::prompt;
use crate::traits::{DatasetSource, GenerationOptions, LanguageModel};

/// Lifecycle of one `evaluate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Running,
    Completed,
    Failed,
}

/// Severity of a human-readable log notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
    Success,
}

/// Outbound notifications from the driver.
///
/// Fire-and-forget: the driver never awaits an observer and its control
/// flow does not depend on whether anything is listening.
pub trait EvalObserver: Send + Sync {
    /// Called after every scored example with the completion percentage and
    /// the snapshot to date.
    fn on_progress(&self, percent: f64, snapshot: &MetricsSnapshot);

    /// Called exactly once when a run completes successfully.
    fn on_complete(&self, snapshot: &MetricsSnapshot);

    /// Human-readable log line. `clear` asks the sink to drop prior lines.
    fn on_log(&self, message: &str, severity: Severity, clear: bool);
}

/// Observer that discards everything.
pub struct NoopObserver;

impl EvalObserver for NoopObserver {
    fn on_progress(&self, _: f64, _: &MetricsSnapshot) {}
    fn on_complete(&self, _: &MetricsSnapshot) {}
    fn on_log(&self, _: &str, _: Severity, _: bool) {}
}

/// Configuration for the evaluation driver.
#[derive(Clone)]
pub struct EvalConfig {
    /// Options forwarded to every generate call.
    pub generation: GenerationOptions,
    /// Token accounting policy; swappable without touching the driver.
    pub token_estimator: TokenEstimator,
    /// Host memory probe; reports 0 where the host exposes nothing.
    pub memory_reader: MemoryReader,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            token_estimator: chars_per_token_estimator(),
            memory_reader: zero_memory_reader(),
        }
    }
}

impl fmt::Debug for EvalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalConfig")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Drives a model through a dataset and aggregates the outcome.
pub struct Evaluator {
    model: Arc<dyn LanguageModel>,
    config: EvalConfig,
    state: Mutex<RunState>,
}

impl Evaluator {
    pub fn new(model: Arc<dyn LanguageModel>, config: EvalConfig) -> Self {
        Self {
            model,
            config,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Current lifecycle state of the most recent run.
    pub fn state(&self) -> RunState {
        *self.state.lock().expect("state lock poisoned")
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().expect("state lock poisoned") = state;
    }

    /// Run the model over every example in the dataset.
    ///
    /// Per-example weirdness (an unclassifiable record, output with no
    /// extractable answer) is absorbed into the malformed count and the run
    /// continues; only dataset-level and model-level failures abort.
    pub async fn evaluate(
        &self,
        dataset: &dyn DatasetSource,
        observer: &dyn EvalObserver,
    ) -> Result<MetricsSnapshot, EvalError> {
        observer.on_log("", Severity::Info, true);
        self.set_state(RunState::Loading);

        match self.run_loop(dataset, observer).await {
            Ok(snapshot) => {
                self.set_state(RunState::Completed);
                Ok(snapshot)
            }
            Err(err) => {
                observer.on_log(&format!("Evaluation error: {err}"), Severity::Error, false);
                self.set_state(RunState::Failed);
                Err(err)
            }
        }
    }

    async fn run_loop(
        &self,
        dataset: &dyn DatasetSource,
        observer: &dyn EvalObserver,
    ) -> Result<MetricsSnapshot, EvalError> {
        observer.on_log("Loading model...", Severity::Info, false);
        self.model.ensure_loaded().await?;

        observer.on_log(
            &format!("Starting evaluation on dataset: {}", dataset.id()),
            Severity::Info,
            false,
        );
        let examples = dataset.read().await?;
        self.set_state(RunState::Running);

        let mut accumulator = ScoreAccumulator::new(self.config.memory_reader.clone());

        if examples.is_empty() {
            let snapshot = accumulator.snapshot();
            observer.on_log("Dataset is empty, nothing to evaluate", Severity::Info, false);
            observer.on_complete(&snapshot);
            return Ok(snapshot);
        }

        let count = examples.len();
        for (i, example) in examples.iter().enumerate() {
            let entry = match prompt::synthesize(example) {
                Ok(synthesized) => {
                    let started = Instant::now();
                    let response = self
                        .model
                        .generate(&synthesized.prompt, &self.config.generation)
                        .await?;
                    let generation_ms = started.elapsed().as_millis() as u64;
                    let extraction = extract::extract(&response, &synthesized.expected);
                    let tokens = (self.config.token_estimator)(&synthesized.prompt, &response);
                    EvalLogEntry {
                        index: i,
                        format: Some(synthesized.format),
                        subject: example.subject().map(str::to_string),
                        expected: synthesized.expected.display(),
                        prompt: synthesized.prompt,
                        predicted: extraction.predicted,
                        is_correct: extraction.is_correct,
                        is_malformed: extraction.is_malformed,
                        generation_ms,
                        tokens,
                    }
                }
                Err(EvalError::UnsupportedExample) => {
                    tracing::warn!(index = i, "example matches no known question format");
                    observer.on_log(
                        &format!("Example {} matches no known question format, skipped", i + 1),
                        Severity::Info,
                        false,
                    );
                    EvalLogEntry {
                        index: i,
                        format: None,
                        subject: example.subject().map(str::to_string),
                        prompt: String::new(),
                        predicted: MALFORMED_SENTINEL.to_string(),
                        expected: String::new(),
                        is_correct: false,
                        is_malformed: true,
                        generation_ms: 0,
                        tokens: 0,
                    }
                }
                Err(err) => return Err(err),
            };

            accumulator.record(entry);
            let snapshot = accumulator.snapshot();
            let percent = (i + 1) as f64 * 100.0 / count as f64;
            observer.on_progress(percent, &snapshot);
            observer.on_log(
                &format!(
                    "Processed {}/{} examples (accuracy {:.1}%, {:.1} tok/s, {} tokens, {} malformed)",
                    i + 1,
                    count,
                    snapshot.accuracy * 100.0,
                    snapshot.latency,
                    snapshot.tokens_processed,
                    snapshot.malformed_responses,
                ),
                Severity::Info,
                false,
            );
        }

        let final_snapshot = accumulator.snapshot();
        observer.on_log("Evaluation complete!", Severity::Success, false);
        observer.on_complete(&final_snapshot);
        Ok(final_snapshot)
    }
}
