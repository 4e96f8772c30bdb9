//! smolbench-providers — Language model backends.
//!
//! Implements the `LanguageModel` trait for the Ollama local inference
//! server (the natural host for the small models smolbench evaluates) and
//! a scripted mock backend for tests.

pub mod config;
pub mod mock;
pub mod ollama;

pub use config::{load_config, load_config_from, SmolbenchConfig};
pub use mock::MockModel;
pub use ollama::OllamaModel;
