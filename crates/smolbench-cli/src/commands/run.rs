//! The `smolbench run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use smolbench_core::engine::{EvalConfig, EvalObserver, Evaluator, Severity};
use smolbench_core::metrics::{MemoryReader, MetricsSnapshot};
use smolbench_core::traits::GenerationOptions;
use smolbench_datasets::DatasetRef;
use smolbench_providers::config::load_config_from;
use smolbench_providers::OllamaModel;
use smolbench_report::RunReport;

/// Console observer: progress and log lines on stderr.
struct ConsoleReporter;

impl EvalObserver for ConsoleReporter {
    fn on_progress(&self, percent: f64, snapshot: &MetricsSnapshot) {
        eprintln!(
            "  [{percent:5.1}%] accuracy {:.1}%, {:.1} tok/s",
            snapshot.accuracy * 100.0,
            snapshot.latency
        );
    }

    fn on_complete(&self, snapshot: &MetricsSnapshot) {
        eprintln!(
            "\nDone: {} examples in {:.1}s",
            snapshot.logs.len(),
            snapshot.eval_time_secs
        );
    }

    fn on_log(&self, message: &str, severity: Severity, clear: bool) {
        // A terminal keeps its scrollback; `clear` only separates runs.
        if clear {
            eprintln!();
            return;
        }
        match severity {
            Severity::Error => eprintln!("  ERROR: {message}"),
            Severity::Success => eprintln!("  {message}"),
            Severity::Info => eprintln!("  {message}"),
        }
    }
}

/// Resident set size of this process, 0 where unsupported.
fn process_memory_reader() -> MemoryReader {
    Arc::new(|| {
        #[cfg(target_os = "linux")]
        {
            // /proc/self/statm: size resident shared ... in pages.
            let statm = match std::fs::read_to_string("/proc/self/statm") {
                Ok(s) => s,
                Err(_) => return 0,
            };
            let resident_pages: u64 = statm
                .split_whitespace()
                .nth(1)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            resident_pages * 4096
        }
        #[cfg(not(target_os = "linux"))]
        {
            0
        }
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    dataset: String,
    model: Option<String>,
    base_url: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let model_name = model.unwrap_or_else(|| config.default_model.clone());
    let base_url = base_url.unwrap_or_else(|| config.ollama_base_url.clone());
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let mut generation: GenerationOptions = config.generation.clone().into();
    if let Some(n) = max_tokens {
        generation.max_tokens = n;
    }
    if let Some(t) = temperature {
        anyhow::ensure!(
            (0.0..=2.0).contains(&t),
            "temperature must be between 0.0 and 2.0"
        );
        generation.temperature = t;
    }

    let reference: DatasetRef = dataset
        .parse()
        .map_err(|e: String| anyhow::anyhow!("invalid dataset reference: {e}"))?;
    let dataset_id = reference.display_id();
    let source = reference.into_source(config.dataset_base_url.as_deref());

    let backend = Arc::new(OllamaModel::new(&model_name, &base_url));
    let eval_config = EvalConfig {
        generation,
        memory_reader: process_memory_reader(),
        ..EvalConfig::default()
    };
    let evaluator = Evaluator::new(backend, eval_config);

    eprintln!("smolbench v0.1.0: evaluating {model_name} on {dataset_id}");

    let metrics = evaluator.evaluate(source.as_ref(), &ConsoleReporter).await?;

    print_summary(&model_name, &metrics);

    let report = RunReport::new(&model_name, &dataset_id, metrics);
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("report-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(model: &str, metrics: &MetricsSnapshot) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Model",
        "Accuracy",
        "Tokens",
        "Tok/s",
        "Eval Time",
        "Malformed",
    ]);
    table.add_row(vec![
        Cell::new(model),
        Cell::new(format!("{:.1}%", metrics.accuracy * 100.0)),
        Cell::new(metrics.tokens_processed),
        Cell::new(format!("{:.1}", metrics.latency)),
        Cell::new(format!("{:.1}s", metrics.eval_time_secs)),
        Cell::new(format!(
            "{}/{}",
            metrics.malformed_responses,
            metrics.logs.len()
        )),
    ]);

    eprintln!("\n{table}");
}
