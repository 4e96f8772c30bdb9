//! The `smolbench validate` command.
//!
//! Reads a dataset and classifies every example without calling a model;
//! useful for checking a new subset before burning inference time on it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use smolbench_core::model::QuestionFormat;
use smolbench_core::prompt;
use smolbench_datasets::DatasetRef;
use smolbench_providers::config::load_config_from;

pub async fn execute(dataset: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let reference: DatasetRef = dataset
        .parse()
        .map_err(|e: String| anyhow::anyhow!("invalid dataset reference: {e}"))?;
    let dataset_id = reference.display_id();
    let source = reference.into_source(config.dataset_base_url.as_deref());

    let examples = source.read().await?;
    println!("Dataset: {dataset_id} ({} examples)", examples.len());

    let mut per_format: BTreeMap<String, usize> = BTreeMap::new();
    let mut unsupported = Vec::new();

    for (i, example) in examples.iter().enumerate() {
        match QuestionFormat::detect(example) {
            Some(format) => {
                *per_format.entry(format.to_string()).or_default() += 1;
                // Detection alone does not guarantee the expected answer is
                // derivable; synthesize to catch records missing key fields.
                if prompt::synthesize(example).is_err() {
                    unsupported.push(i + 1);
                }
            }
            None => unsupported.push(i + 1),
        }
    }

    for (format, count) in &per_format {
        println!("  {format}: {count}");
    }

    if unsupported.is_empty() {
        println!("All examples classified.");
    } else {
        println!(
            "\n{} example(s) would be skipped as unsupported: lines {:?}",
            unsupported.len(),
            unsupported
        );
    }

    Ok(())
}
