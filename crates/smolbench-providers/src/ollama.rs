//! Ollama (local inference server) backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::instrument;

use smolbench_core::error::EvalError;
use smolbench_core::traits::{GenerationOptions, LanguageModel, ModelInfo};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// A model served by a local Ollama instance.
pub struct OllamaModel {
    model: String,
    base_url: String,
    client: reqwest::Client,
    // One-shot readiness check; concurrent callers cannot double-load.
    loaded: OnceCell<()>,
}

impl OllamaModel {
    pub fn new(model: &str, base_url: &str) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            model: model.to_string(),
            base_url: base.trim_end_matches('/').to_string(),
            client,
            loaded: OnceCell::new(),
        }
    }

    async fn check_model_served(&self) -> Result<(), EvalError> {
        let tags = self.fetch_tags().await?;
        let served = tags.models.iter().any(|m| m.name == self.model);
        if served {
            tracing::debug!(model = %self.model, "model is served");
            Ok(())
        } else {
            Err(EvalError::ModelUnavailable(format!(
                "model '{}' is not served at {} (try `ollama pull {}`)",
                self.model, self.base_url, self.model
            )))
        }
    }

    async fn fetch_tags(&self) -> Result<OllamaTags, EvalError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| EvalError::ModelUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EvalError::ModelUnavailable(format!(
                "HTTP {} from {}/api/tags",
                response.status().as_u16(),
                self.base_url
            )));
        }

        response
            .json::<OllamaTags>()
            .await
            .map_err(|e| EvalError::ModelUnavailable(format!("failed to parse tags: {e}")))
    }
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Deserialize)]
struct OllamaTag {
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    details: Option<OllamaTagDetails>,
}

#[derive(Deserialize)]
struct OllamaTagDetails {
    #[serde(default)]
    parameter_size: Option<String>,
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn ensure_loaded(&self) -> Result<(), EvalError> {
        self.loaded
            .get_or_try_init(|| self.check_model_served())
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, prompt, options), fields(model = %self.model))]
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, EvalError> {
        self.ensure_loaded().await?;

        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: options.max_tokens,
                temperature: options.temperature,
                stop: options.stop_sequences.clone(),
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvalError::Generation(format!(
                        "request timed out after {DEFAULT_TIMEOUT_SECS}s"
                    ))
                } else {
                    EvalError::Generation(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(EvalError::ModelUnavailable(self.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(EvalError::Generation(format!("HTTP {status}: {body}")));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| EvalError::Generation(format!("failed to parse response: {e}")))?;

        Ok(parsed.response)
    }

    async fn available_models(&self) -> Result<Vec<ModelInfo>, EvalError> {
        let tags = self.fetch_tags().await?;
        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name,
                size_bytes: m.size,
                parameter_size: m.details.and_then(|d| d.parameter_size),
            })
            .collect())
    }
}
