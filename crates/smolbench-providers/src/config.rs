//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use smolbench_core::traits::GenerationOptions;

/// Top-level smolbench configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmolbenchConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub ollama_base_url: String,
    /// Model evaluated when none is given on the command line.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Base URL that `repo:file` dataset references resolve against; the
    /// built-in default is used when unset.
    #[serde(default)]
    pub dataset_base_url: Option<String>,
    /// Output directory for run reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Generation knobs applied to every run.
    #[serde(default)]
    pub generation: GenerationDefaults,
}

/// Generation settings as written in config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationDefaults {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// 0.0 keeps scoring runs deterministic.
    #[serde(default)]
    pub temperature: f64,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

impl From<GenerationDefaults> for GenerationOptions {
    fn from(defaults: GenerationDefaults) -> Self {
        GenerationOptions {
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            stop_sequences: Vec::new(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "smollm2:135m".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./smolbench-results")
}
fn default_max_tokens() -> u32 {
    256
}

impl Default for SmolbenchConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_url(),
            default_model: default_model(),
            dataset_base_url: None,
            output_dir: default_output_dir(),
            generation: GenerationDefaults::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `smolbench.toml` in the current directory
/// 2. `~/.config/smolbench/config.toml`
///
/// Environment variable override: `SMOLBENCH_OLLAMA_URL`.
pub fn load_config() -> Result<SmolbenchConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SmolbenchConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("smolbench.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = config_dir() {
            let global = dir.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SmolbenchConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SmolbenchConfig::default(),
    };

    if let Ok(url) = std::env::var("SMOLBENCH_OLLAMA_URL") {
        config.ollama_base_url = url;
    }

    config.ollama_base_url = resolve_env_vars(&config.ollama_base_url);
    if let Some(base) = &config.dataset_base_url {
        config.dataset_base_url = Some(resolve_env_vars(base));
    }

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("smolbench"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SmolbenchConfig::default();
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert_eq!(config.default_model, "smollm2:135m");
        assert_eq!(config.generation.temperature, 0.0);
        assert!(config.dataset_base_url.is_none());
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SMOLBENCH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SMOLBENCH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SMOLBENCH_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SMOLBENCH_TEST_VAR");
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
ollama_base_url = "http://gpu-box:11434"
default_model = "qwen2.5:0.5b"
dataset_base_url = "https://mirror.internal/datasets"
output_dir = "/tmp/results"

[generation]
max_tokens = 64
temperature = 0.2
"#;
        let config: SmolbenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ollama_base_url, "http://gpu-box:11434");
        assert_eq!(config.generation.max_tokens, 64);
        assert_eq!(config.generation.temperature, 0.2);

        let options: GenerationOptions = config.generation.into();
        assert_eq!(options.max_tokens, 64);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: SmolbenchConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_model, "smollm2:135m");
        assert_eq!(config.generation.max_tokens, 256);
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smolbench.toml");
        std::fs::write(&path, "default_model = \"tinyllama:1.1b\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_model, "tinyllama:1.1b");
    }

    #[test]
    fn missing_explicit_path_errors() {
        assert!(load_config_from(Some(Path::new("/nonexistent/smolbench.toml"))).is_err());
    }
}
