//! End-to-end evaluation pipeline tests.
//!
//! Drives the full loop (dataset read, prompt synthesis, generation, answer
//! extraction, scoring, progress reporting) with a scripted mock backend,
//! plus one pass over HTTP with a mock Ollama server.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use smolbench_core::engine::{EvalConfig, EvalObserver, Evaluator, RunState, Severity};
use smolbench_core::metrics::MetricsSnapshot;
use smolbench_datasets::{FileDataset, HttpDataset};
use smolbench_providers::{MockModel, OllamaModel};
use smolbench_report::RunReport;

#[derive(Default)]
struct RecordingObserver {
    percents: Mutex<Vec<f64>>,
    completions: AtomicU32,
    logs: Mutex<Vec<String>>,
}

impl EvalObserver for RecordingObserver {
    fn on_progress(&self, percent: f64, _: &MetricsSnapshot) {
        self.percents.lock().unwrap().push(percent);
    }

    fn on_complete(&self, _: &MetricsSnapshot) {
        self.completions.fetch_add(1, Ordering::Relaxed);
    }

    fn on_log(&self, message: &str, _: Severity, _: bool) {
        self.logs.lock().unwrap().push(message.to_string());
    }
}

fn write_dataset(dir: &tempfile::TempDir, name: &str, body: &str) -> FileDataset {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    FileDataset::new(path)
}

// --- Scenario A: two TruthfulQA lines, model always answers <<A>> ---

#[tokio::test]
async fn truthfulqa_fixed_answer_scores_half() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        &dir,
        "truthfulqa.jsonl",
        concat!(
            "{\"question\": \"Q1\", \"choices\": [\"yes\", \"no\"], \"gold_index\": 0}\n",
            "{\"question\": \"Q2\", \"choices\": [\"yes\", \"no\"], \"gold_index\": 1}\n",
        ),
    );

    let model = Arc::new(MockModel::with_fixed_response("<<A>>"));
    let evaluator = Evaluator::new(model.clone(), EvalConfig::default());
    let observer = RecordingObserver::default();

    let metrics = evaluator.evaluate(&dataset, &observer).await.unwrap();

    assert_eq!(metrics.accuracy, 0.5);
    assert_eq!(metrics.logs.len(), 2);
    assert!(metrics.logs[0].is_correct);
    assert!(!metrics.logs[1].is_correct);
    assert_eq!(model.call_count(), 2);
    assert!(model.load_count() >= 1);
}

// --- Scenario B: one ARC example, chatty but well-formed answer ---

#[tokio::test]
async fn arc_answer_embedded_in_prose_is_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        &dir,
        "arc.jsonl",
        "{\"question\": \"Which gas?\", \"choices\": {\"text\": [\"O2\", \"N2\", \"CO2\", \"H2\"], \"label\": [\"A\", \"B\", \"C\", \"D\"]}, \"answerKey\": \"C\"}\n",
    );

    let model = Arc::new(MockModel::with_fixed_response(
        "I think the answer is <<C>> because plants need it.",
    ));
    let evaluator = Evaluator::new(model.clone(), EvalConfig::default());
    let observer = RecordingObserver::default();

    let metrics = evaluator.evaluate(&dataset, &observer).await.unwrap();

    assert_eq!(metrics.accuracy, 1.0);
    let entry = &metrics.logs[0];
    assert_eq!(entry.predicted, "C");
    assert_eq!(entry.expected, "C");
    assert!(entry.is_correct);
    assert!(!entry.is_malformed);

    // The synthesized prompt carried the question, the labeled choices, and
    // the delimiter instruction.
    let prompt = model.last_prompt().unwrap();
    assert!(prompt.contains("Which gas?"));
    assert!(prompt.contains("C) CO2"));
    assert!(prompt.contains("<<X>>"));
}

// --- Scenario C: one MathQA example, no numeric content in the output ---

#[tokio::test]
async fn mathqa_without_numeric_answer_counts_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        &dir,
        "mathqa.jsonl",
        "{\"question\": \"6*7?\", \"answer\": \"42\", \"equation\": \"6*7\"}\n",
    );

    let model = Arc::new(MockModel::with_fixed_response("no numeric content here"));
    let evaluator = Evaluator::new(model, EvalConfig::default());
    let observer = RecordingObserver::default();

    let metrics = evaluator.evaluate(&dataset, &observer).await.unwrap();

    assert_eq!(metrics.malformed_responses, 1);
    assert_eq!(metrics.accuracy, 0.0);
    let entry = &metrics.logs[0];
    assert!(entry.is_malformed);
    assert!(!entry.is_correct);
    assert_eq!(entry.predicted, "No properly formatted answer found");
}

// --- Scenario D: empty dataset completes immediately ---

#[tokio::test]
async fn empty_dataset_completes_with_zero_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(&dir, "empty.jsonl", "\n\n");

    let model = Arc::new(MockModel::with_fixed_response("<<A>>"));
    let evaluator = Evaluator::new(model.clone(), EvalConfig::default());
    let observer = RecordingObserver::default();

    let metrics = evaluator.evaluate(&dataset, &observer).await.unwrap();

    assert_eq!(metrics.logs.len(), 0);
    assert_eq!(metrics.accuracy, 0.0);
    assert!(metrics.accuracy.is_finite());
    assert_eq!(model.call_count(), 0);
    assert_eq!(observer.completions.load(Ordering::Relaxed), 1);
    assert_eq!(evaluator.state(), RunState::Completed);
}

// --- Mixed-format dataset with a scripted backend ---

#[tokio::test]
async fn mixed_formats_score_independently() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        &dir,
        "mixed.jsonl",
        concat!(
            "{\"question\": \"2+2?\", \"choices\": [\"3\", \"4\", \"5\", \"6\"], \"answer\": 1}\n",
            "{\"question\": \"Speed?\", \"answer\": \"60\", \"equation\": \"120/2\"}\n",
            "{\"prompt\": \"Describe the sea, all lowercase.\", \"instruction_id_list\": [\"change_case:english_lowercase\"], \"kwargs\": [{}]}\n",
        ),
    );

    let model = Arc::new(MockModel::with_script(vec![
        "<<B>>".into(),
        "the speed is <<60.004>>".into(),
        "the sea is calm and endless".into(),
    ]));
    let evaluator = Evaluator::new(model, EvalConfig::default());
    let observer = RecordingObserver::default();

    let metrics = evaluator.evaluate(&dataset, &observer).await.unwrap();

    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.malformed_responses, 0);
    assert_eq!(metrics.logs.len(), 3);
    // Numeric scoring applied the 0.01 tolerance.
    assert!(metrics.logs[1].is_correct);
    // Free-form kept the raw response as the prediction.
    assert_eq!(metrics.logs[2].predicted, "the sea is calm and endless");

    let percents = observer.percents.lock().unwrap().clone();
    assert_eq!(percents.len(), 3);
    assert_eq!(*percents.last().unwrap(), 100.0);

    let logs = observer.logs.lock().unwrap();
    assert!(logs.iter().any(|l| l.contains("Processed 3/3")));
    assert!(logs.iter().any(|l| l.contains("Evaluation complete!")));
}

// --- Token accounting matches the character heuristic ---

#[tokio::test]
async fn token_count_uses_quarter_character_heuristic() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        &dir,
        "one.jsonl",
        "{\"question\": \"Q\", \"choices\": [\"a\", \"b\"], \"answer\": 0}\n",
    );

    let model = Arc::new(MockModel::with_fixed_response("<<A>>"));
    let evaluator = Evaluator::new(model.clone(), EvalConfig::default());

    let metrics = evaluator
        .evaluate(&dataset, &smolbench_core::engine::NoopObserver)
        .await
        .unwrap();

    let prompt_len = model.last_prompt().unwrap().len();
    let expected_tokens = ((prompt_len + "<<A>>".len()) / 4) as u64;
    assert_eq!(metrics.tokens_processed, expected_tokens);
    assert_eq!(metrics.logs[0].tokens, expected_tokens);
}

// --- Full pass over HTTP: dataset and Ollama both mocked ---

#[tokio::test]
async fn http_dataset_through_ollama_backend() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subsets/arc.jsonl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "{\"question\": \"Which gas?\", \"choices\": {\"text\": [\"O2\", \"N2\", \"CO2\", \"H2\"]}, \"answerKey\": \"A\"}\n",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [{"name": "smollm2:135m"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "<<A>>",
            "done": true
        })))
        .mount(&server)
        .await;

    let dataset = HttpDataset::new(
        "arc".to_string(),
        format!("{}/subsets/arc.jsonl", server.uri()),
    );
    let model = Arc::new(OllamaModel::new("smollm2:135m", &server.uri()));
    let evaluator = Evaluator::new(model, EvalConfig::default());
    let observer = RecordingObserver::default();

    let metrics = evaluator.evaluate(&dataset, &observer).await.unwrap();

    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(evaluator.state(), RunState::Completed);

    // The final snapshot feeds the report without loss.
    let report = RunReport::new("smollm2:135m", "arc", metrics);
    let md = report.to_markdown();
    assert!(md.contains("accuracy 100.0%"));
    assert!(md.contains("| 1 | arc | A | A | yes |"));
}
