//! The `smolbench list-models` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use smolbench_core::traits::LanguageModel;
use smolbench_providers::config::load_config_from;
use smolbench_providers::OllamaModel;

pub async fn execute(base_url: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let base_url = base_url.unwrap_or_else(|| config.ollama_base_url.clone());

    let backend = OllamaModel::new(&config.default_model, &base_url);
    let models = backend.available_models().await?;

    if models.is_empty() {
        println!("No models served at {base_url}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Model", "Parameters", "Size"]);
    for model in &models {
        table.add_row(vec![
            model.id.clone(),
            model.parameter_size.clone().unwrap_or_default(),
            model
                .size_bytes
                .map(|b| format!("{:.1} MB", b as f64 / 1_000_000.0))
                .unwrap_or_default(),
        ]);
    }

    println!("{table}");
    Ok(())
}
