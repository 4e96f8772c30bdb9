//! smolbench CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "smolbench", version, about = "Benchmark harness for small language models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model against a benchmark dataset
    Run {
        /// Dataset reference: "repo:file.jsonl", a URL, or a local path
        #[arg(long)]
        dataset: String,

        /// Model to evaluate (e.g. "smollm2:135m")
        #[arg(long)]
        model: Option<String>,

        /// Ollama base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Max tokens to generate per example
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Generation temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Output directory for the run report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify every example in a dataset without calling a model
    Validate {
        /// Dataset reference: "repo:file.jsonl", a URL, or a local path
        #[arg(long)]
        dataset: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List models served by the configured backend
    ListModels {
        /// Ollama base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and a demo dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("smolbench=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            dataset,
            model,
            base_url,
            max_tokens,
            temperature,
            output,
            format,
            config,
        } => {
            commands::run::execute(
                dataset,
                model,
                base_url,
                max_tokens,
                temperature,
                output,
                format,
                config,
            )
            .await
        }
        Commands::Validate { dataset, config } => {
            commands::validate::execute(dataset, config).await
        }
        Commands::ListModels { base_url, config } => {
            commands::list_models::execute(base_url, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
