//! Dataset reference parsing.
//!
//! A dataset is named by an opaque reference on the command line or in
//! config: a `repo:file` subset identifier resolved against a hosted base
//! URL, an explicit URL, or a local path.

use std::path::PathBuf;
use std::str::FromStr;

use smolbench_core::traits::DatasetSource;

use crate::reader::{FileDataset, HttpDataset};

/// Base URL that `repo:file` subset references resolve against.
pub const DEFAULT_SUBSET_BASE: &str = "https://huggingface.co/datasets";

/// A parsed dataset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetRef {
    /// Hosted subset named `repo:file`, e.g.
    /// `smolbench/mmlu-nano:mmlu_high_school_mathematics.jsonl`.
    Subset { repo: String, file: String },
    /// Explicit URL to a JSONL resource.
    Url(String),
    /// Local JSONL file.
    Path(PathBuf),
}

impl FromStr for DatasetRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("dataset reference is empty".to_string());
        }
        if trimmed.contains("://") {
            return Ok(DatasetRef::Url(trimmed.to_string()));
        }
        if let Some((repo, file)) = trimmed.split_once(':') {
            if repo.is_empty() || file.is_empty() {
                return Err(format!("malformed subset reference: {trimmed}"));
            }
            return Ok(DatasetRef::Subset {
                repo: repo.to_string(),
                file: file.to_string(),
            });
        }
        Ok(DatasetRef::Path(PathBuf::from(trimmed)))
    }
}

impl DatasetRef {
    /// The URL this reference resolves to, if it names a hosted resource.
    pub fn url(&self, base: Option<&str>) -> Option<String> {
        match self {
            DatasetRef::Subset { repo, file } => {
                let base = base.unwrap_or(DEFAULT_SUBSET_BASE).trim_end_matches('/');
                Some(format!("{base}/{repo}/resolve/main/{file}"))
            }
            DatasetRef::Url(url) => Some(url.clone()),
            DatasetRef::Path(_) => None,
        }
    }

    /// Build the concrete source for this reference.
    pub fn into_source(self, base: Option<&str>) -> Box<dyn DatasetSource> {
        let id = self.display_id();
        match self {
            DatasetRef::Subset { .. } | DatasetRef::Url(_) => {
                let url = self.url(base).expect("hosted reference resolves to a URL");
                Box::new(HttpDataset::new(id, url))
            }
            DatasetRef::Path(path) => Box::new(FileDataset::new(path)),
        }
    }

    /// Identifier used in logs and reports.
    pub fn display_id(&self) -> String {
        match self {
            DatasetRef::Subset { repo, file } => format!("{repo}:{file}"),
            DatasetRef::Url(url) => url.clone(),
            DatasetRef::Path(path) => path.display().to_string(),
        }
    }
}
