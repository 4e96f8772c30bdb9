//! Mock backend for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use smolbench_core::error::EvalError;
use smolbench_core::traits::{GenerationOptions, LanguageModel, ModelInfo};

/// A mock language model for exercising the evaluation driver without a
/// running inference server.
///
/// Responses are picked from a scripted sequence when one is set, otherwise
/// by prompt-substring matching, otherwise the fixed default.
pub struct MockModel {
    /// Map of prompt substring to response.
    responses: HashMap<String, String>,
    /// Default response if nothing matches.
    default_response: String,
    /// Responses consumed in order before any matching applies.
    script: Mutex<VecDeque<String>>,
    call_count: AtomicU32,
    load_count: AtomicU32,
    last_prompt: Mutex<Option<String>>,
}

impl MockModel {
    /// Create a mock with prompt-substring response mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "<<A>>".to_string(),
            script: Mutex::new(VecDeque::new()),
            call_count: AtomicU32::new(0),
            load_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            script: Mutex::new(VecDeque::new()),
            call_count: AtomicU32::new(0),
            load_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a mock that plays back responses in order, then falls back to
    /// the default.
    pub fn with_script(responses: Vec<String>) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: "<<A>>".to_string(),
            script: Mutex::new(responses.into()),
            call_count: AtomicU32::new(0),
            load_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of generate calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Number of ensure_loaded calls made.
    pub fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::Relaxed)
    }

    /// The most recent prompt received.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ensure_loaded(&self) -> Result<(), EvalError> {
        self.load_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn generate(&self, prompt: &str, _: &GenerationOptions) -> Result<String, EvalError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return Ok(next);
        }

        Ok(self
            .responses
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone()))
    }

    async fn available_models(&self) -> Result<Vec<ModelInfo>, EvalError> {
        Ok(vec![ModelInfo {
            id: "mock".into(),
            size_bytes: None,
            parameter_size: None,
        }])
    }
}
