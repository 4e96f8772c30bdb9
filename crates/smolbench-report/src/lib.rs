//! smolbench-report — Run report types with JSON persistence.
//!
//! A run report bundles host information, the final metrics snapshot, and
//! the full ordered evaluation log; everything in it is derived one-to-one
//! from the snapshot the driver returns.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use smolbench_core::metrics::MetricsSnapshot;

/// A complete evaluation run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Model that was evaluated.
    pub model: String,
    /// Dataset reference the run used.
    pub dataset: String,
    /// Host information.
    pub system: SystemInfo,
    /// Final metrics, including the per-example log.
    pub metrics: MetricsSnapshot,
}

/// Host details recorded alongside the metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cores: usize,
}

impl SystemInfo {
    /// Capture the current host.
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cores: std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1),
        }
    }
}

impl RunReport {
    /// Assemble a report from a finished run.
    pub fn new(model: &str, dataset: &str, metrics: MetricsSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            model: model.to_string(),
            dataset: dataset.to_string(),
            system: SystemInfo::collect(),
            metrics,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: RunReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let m = &self.metrics;

        md.push_str(&format!(
            "# smolbench run: {} on {}\n\n{} | {}/{} ({} cores)\n\n",
            self.model,
            self.dataset,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.system.os,
            self.system.arch,
            self.system.cores
        ));

        md.push_str(&format!(
            "**Summary:** accuracy {:.1}%, {} tokens at {:.1} tok/s, \
             {:.1}s wall clock, {} malformed of {} examples\n\n",
            m.accuracy * 100.0,
            m.tokens_processed,
            m.latency,
            m.eval_time_secs,
            m.malformed_responses,
            m.logs.len()
        ));

        if !m.logs.is_empty() {
            md.push_str("| # | Format | Predicted | Expected | Correct |\n");
            md.push_str("|---|--------|-----------|----------|---------|\n");
            for entry in &m.logs {
                let format = entry
                    .format
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    entry.index + 1,
                    format,
                    sanitize_cell(&entry.predicted),
                    sanitize_cell(&entry.expected),
                    if entry.is_correct { "yes" } else { "no" },
                ));
            }
        }

        md
    }
}

/// Keep table cells single-line and short.
fn sanitize_cell(s: &str) -> String {
    let flattened = s.replace(['\n', '|'], " ");
    let mut out: String = flattened.chars().take(60).collect();
    if flattened.chars().count() > 60 {
        out.push_str("...");
    }
    out
}
