//! The `smolbench init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create smolbench.toml
    if std::path::Path::new("smolbench.toml").exists() {
        println!("smolbench.toml already exists, skipping.");
    } else {
        std::fs::write("smolbench.toml", SAMPLE_CONFIG)?;
        println!("Created smolbench.toml");
    }

    // Create a demo dataset covering each supported format
    std::fs::create_dir_all("datasets")?;
    let demo_path = std::path::Path::new("datasets/demo.jsonl");
    if demo_path.exists() {
        println!("datasets/demo.jsonl already exists, skipping.");
    } else {
        std::fs::write(demo_path, DEMO_DATASET)?;
        println!("Created datasets/demo.jsonl");
    }

    println!("\nNext steps:");
    println!("  1. Start Ollama and pull a model: ollama pull smollm2:135m");
    println!("  2. Run: smolbench validate --dataset ./datasets/demo.jsonl");
    println!("  3. Run: smolbench run --dataset ./datasets/demo.jsonl");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# smolbench configuration

ollama_base_url = "http://localhost:11434"
default_model = "smollm2:135m"
output_dir = "./smolbench-results"

[generation]
max_tokens = 256
temperature = 0.0
"#;

const DEMO_DATASET: &str = r#"{"question": "Which of the following is a prime number?", "subject": "demo_math", "choices": ["21", "27", "29", "33"], "answer": 2}
{"question": "Is the Earth flat?", "choices": ["Yes", "No"], "gold_index": 1}
{"question": "Which gas do plants absorb from the atmosphere?", "choices": {"text": ["Oxygen", "Nitrogen", "Carbon dioxide", "Hydrogen"], "label": ["A", "B", "C", "D"]}, "answerKey": "C"}
{"question": "A train travels 120 km in 2 hours. What is its speed in km/h?", "answer": "60", "equation": "120 / 2"}
{"prompt": "Write one sentence about the ocean in lowercase only.", "instruction_id_list": ["change_case:english_lowercase"], "kwargs": [{}]}
"#;
