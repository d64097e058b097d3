mod file_config;

pub use file_config::{FileConfig, LlmConfig};

use crate::agent::llm::{ApiKeySource, CompletionOptions};
use crate::provisioning::DEFAULT_VERIFY_SAMPLE_SIZE;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "provisioner.db";
pub const DEFAULT_ARTIFACTS_DIR: &str = "generated";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Entity store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// Nothing persists past the process; useful for dry runs.
    Memory,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub artifacts_dir: Option<PathBuf>,
    pub store: StoreBackend,
    pub seed_file: Option<PathBuf>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub artifacts_dir: PathBuf,
    pub store: StoreBackend,
    /// Built-in fixtures are used when unset.
    pub seed_file: Option<PathBuf>,
    pub verify_sample_size: usize,
    /// Unset when no endpoint is configured; classification then runs degraded.
    pub llm: Option<LlmSettings>,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: ApiKeySource,
    pub timeout: Duration,
    pub temperature: f32,
}

impl LlmSettings {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            timeout: self.timeout,
            json_output: true,
            ..CompletionOptions::default()
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let store = match file.store {
            Some(s) => parse_store_backend(&s)
                .ok_or_else(|| anyhow::anyhow!("Unknown store backend in config file: {}", s))?,
            None => cli.store,
        };

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        if store == StoreBackend::Sqlite {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.is_dir() {
                    bail!("Database directory does not exist: {:?}", parent);
                }
            }
            if db_path.is_dir() {
                bail!("db_path is a directory: {:?}", db_path);
            }
        }

        let artifacts_dir = file
            .artifacts_dir
            .map(PathBuf::from)
            .or_else(|| cli.artifacts_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));
        if artifacts_dir.is_file() {
            bail!("artifacts_dir is not a directory: {:?}", artifacts_dir);
        }

        let seed_file = file
            .seed_file
            .map(PathBuf::from)
            .or_else(|| cli.seed_file.clone());
        if let Some(path) = &seed_file {
            if !path.is_file() {
                bail!("Seed file does not exist: {:?}", path);
            }
        }

        let verify_sample_size = file
            .verify_sample_size
            .unwrap_or(DEFAULT_VERIFY_SAMPLE_SIZE);
        if verify_sample_size == 0 {
            bail!("verify_sample_size must be at least 1");
        }

        let llm_file = file.llm.unwrap_or_default();
        let llm = llm_file
            .base_url
            .clone()
            .or_else(|| cli.llm_base_url.clone())
            .map(|base_url| {
                let api_key = match (&llm_file.api_key_command, &llm_file.api_key) {
                    (Some(cmd), _) => ApiKeySource::Command(cmd.clone()),
                    (None, Some(key)) => ApiKeySource::Static(key.clone()),
                    (None, None) => cli
                        .llm_api_key
                        .clone()
                        .map(ApiKeySource::Static)
                        .unwrap_or(ApiKeySource::None),
                };
                LlmSettings {
                    base_url,
                    model: llm_file
                        .model
                        .clone()
                        .or_else(|| cli.llm_model.clone())
                        .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                    api_key,
                    timeout: Duration::from_secs(
                        llm_file.timeout_secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
                    ),
                    temperature: llm_file.temperature.unwrap_or(0.0),
                }
            });

        Ok(AppConfig {
            db_path,
            artifacts_dir,
            store,
            seed_file,
            verify_sample_size,
            llm,
        })
    }
}

fn parse_store_backend(s: &str) -> Option<StoreBackend> {
    StoreBackend::from_str(s, true).ok()
}
