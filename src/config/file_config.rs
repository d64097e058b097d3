use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub artifacts_dir: Option<String>,
    /// "sqlite" or "memory"
    pub store: Option<String>,
    pub seed_file: Option<String>,
    pub verify_sample_size: Option<usize>,

    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL, e.g. "http://localhost:11434/v1"
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Shell command printing the API key; takes precedence over api_key.
    pub api_key_command: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
