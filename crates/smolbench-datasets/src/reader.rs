//! JSONL dataset readers.
//!
//! Each call fetches the whole resource and parses it line by line; there is
//! no caching and no retry. A failed fetch is `DatasetUnavailable`, a line
//! that is not valid JSON is `DatasetLine` with its one-based line number.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use smolbench_core::error::EvalError;
use smolbench_core::model::Example;
use smolbench_core::traits::DatasetSource;

const FETCH_TIMEOUT_SECS: u64 = 60;

/// Split JSONL text into examples.
///
/// Blank and whitespace-only lines are discarded; every remaining line must
/// parse as a standalone JSON value.
pub fn parse_jsonl(text: &str) -> Result<Vec<Example>, EvalError> {
    let mut examples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|e| EvalError::DatasetLine {
            line_no: i + 1,
            reason: e.to_string(),
        })?;
        examples.push(Example::from_value(value));
    }
    Ok(examples)
}

/// A hosted JSONL dataset fetched over HTTP.
pub struct HttpDataset {
    id: String,
    url: String,
    client: reqwest::Client,
}

impl HttpDataset {
    pub fn new(id: String, url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");
        Self { id, url, client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DatasetSource for HttpDataset {
    fn id(&self) -> &str {
        &self.id
    }

    async fn read(&self) -> Result<Vec<Example>, EvalError> {
        tracing::debug!(url = %self.url, "fetching dataset");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| EvalError::DatasetUnavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvalError::DatasetUnavailable {
                reason: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown status")
                ),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| EvalError::DatasetUnavailable {
                reason: e.to_string(),
            })?;

        parse_jsonl(&text)
    }
}

/// A JSONL dataset read from the local filesystem.
pub struct FileDataset {
    id: String,
    path: PathBuf,
}

impl FileDataset {
    pub fn new(path: PathBuf) -> Self {
        Self {
            id: path.display().to_string(),
            path,
        }
    }
}

#[async_trait]
impl DatasetSource for FileDataset {
    fn id(&self) -> &str {
        &self.id
    }

    async fn read(&self) -> Result<Vec<Example>, EvalError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EvalError::DatasetUnavailable {
                reason: format!("{}: {e}", self.path.display()),
            }
        })?;
        parse_jsonl(&text)
    }
}
