use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

use pezzottify_provisioner::agent::intent::TRIGGERS;
use pezzottify_provisioner::agent::{
    IntentClassifier, LlmIntentClassifier, LlmProvider, OfflineClassifier, OpenAIProvider,
};
use pezzottify_provisioner::artifacts::FsArtifactSink;
use pezzottify_provisioner::config::{AppConfig, CliConfig, FileConfig, StoreBackend};
use pezzottify_provisioner::entity_store::{EntityStore, InMemoryEntityStore, SqliteEntityStore};
use pezzottify_provisioner::orchestrator::{QueryOrchestrator, RunReport};
use pezzottify_provisioner::provisioning::ProvisioningEngine;
use pezzottify_provisioner::seed::SeedCatalog;

mod cli_style;
use cli_style::get_styles;

const SELF_TEST_QUERIES: [&str; 2] = [
    "Can you store the recently played songs in a table",
    "Can you store the 'Made for you' and 'Popular albums' in a table",
];

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles(), version, about = "Provision home-screen data from plain-language requests")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database file holding provisioned tables.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Directory generated endpoint queries are written to.
    #[clap(long, value_parser = parse_path)]
    pub artifacts_dir: Option<PathBuf>,

    /// Entity store backend.
    #[clap(long, value_enum, default_value_t = StoreBackend::Sqlite)]
    pub store: StoreBackend,

    /// JSON file with seed rows, replacing the built-in fixtures.
    #[clap(long, value_parser = parse_path)]
    pub seed_file: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible API used for intent classification.
    /// Without it, kinds are derived from keywords only.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Model name for intent classification.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// API key for the LLM endpoint.
    #[clap(long)]
    pub llm_api_key: Option<String>,

    /// Print run reports as JSON instead of the styled trace.
    #[clap(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read requests interactively (default).
    Prompt,
    /// Run a single request and exit.
    Run { query: String },
    /// Run the built-in two-request sequence.
    SelfTest,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
            store: self.store,
            seed_file: self.seed_file.clone(),
            llm_base_url: self.llm_base_url.clone(),
            llm_model: self.llm_model.clone(),
            llm_api_key: self.llm_api_key.clone(),
        }
    }
}

fn build_store(config: &AppConfig) -> Result<Arc<dyn EntityStore>> {
    Ok(match config.store {
        StoreBackend::Sqlite => {
            info!("Opening entity database at {:?}...", config.db_path);
            Arc::new(SqliteEntityStore::new(&config.db_path)?)
        }
        StoreBackend::Memory => {
            info!("Using in-memory entity store, nothing will be persisted");
            Arc::new(InMemoryEntityStore::new())
        }
    })
}

fn build_seeds(config: &AppConfig) -> Result<SeedCatalog> {
    match &config.seed_file {
        Some(path) => {
            info!("Loading seed data from {:?}", path);
            SeedCatalog::from_json_file(path)
        }
        None => Ok(SeedCatalog::builtin()),
    }
}

async fn build_classifier(config: &AppConfig) -> Arc<dyn IntentClassifier> {
    let Some(llm) = &config.llm else {
        info!("No LLM endpoint configured, classification will run degraded");
        return Arc::new(OfflineClassifier);
    };

    info!(base_url = %llm.base_url, model = %llm.model, "Using LLM intent classifier");
    let provider = OpenAIProvider::new(&llm.base_url, &llm.model, llm.api_key.clone());
    if let Err(e) = provider.health_check().await {
        warn!("LLM endpoint health check failed: {}", e);
    }

    Arc::new(
        LlmIntentClassifier::new(Arc::new(provider))
            .with_completion_options(llm.completion_options()),
    )
}

fn print_run(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        cli_style::print_report(report);
    }
    Ok(())
}

async fn run_query(orchestrator: &QueryOrchestrator, query: &str, json: bool) -> Result<()> {
    let report = orchestrator.run(query).await;
    print_run(&report, json)?;
    report
        .into_result()
        .with_context(|| format!("Request failed: {}", query))?;
    Ok(())
}

#[derive(rustyline_derive::Hinter)]
struct PromptHelper {
    phrases: Vec<&'static str>,
}

impl PromptHelper {
    pub fn new() -> Self {
        PromptHelper {
            phrases: TRIGGERS.iter().map(|t| t.phrase).collect(),
        }
    }
}

impl Completer for PromptHelper {
    type Candidate = String;

    /// Completes a section name from the start of the word under the cursor.
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let before = &line[..pos];
        let starts = std::iter::once(0).chain(before.match_indices(' ').map(|(i, _)| i + 1));

        for start in starts {
            let fragment = before[start..].to_lowercase();
            if fragment.is_empty() {
                continue;
            }
            let matches: Vec<String> = self
                .phrases
                .iter()
                .filter(|p| p.starts_with(&fragment))
                .map(|p| p.to_string())
                .collect();
            if !matches.is_empty() {
                return Ok((start, matches));
            }
        }
        Ok((pos, Vec::with_capacity(0)))
    }
}

impl Highlighter for PromptHelper {}
impl Validator for PromptHelper {}
impl Helper for PromptHelper {}

async fn prompt_loop(orchestrator: &QueryOrchestrator, json: bool) -> Result<()> {
    cli_style::print_banner("Describe the data you want stored; 'exit' to quit");

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<PromptHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(PromptHelper::new()));
    let prompt = cli_style::get_prompt();
    let mut failed = 0usize;

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if matches!(query, "exit" | "quit") {
                    break;
                }
                let _ = rl.add_history_entry(query);

                // The prompt stays open; the exit status reports the failure.
                if let Err(e) = run_query(orchestrator, query, json).await {
                    warn!("{:#}", e);
                    failed += 1;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    cli_style::print_goodbye();
    if failed > 0 {
        bail!("{} request(s) failed during the session", failed);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let store = build_store(&config)?;
    let seeds = build_seeds(&config)?;
    let classifier = build_classifier(&config).await;
    let engine = ProvisioningEngine::new(store, Arc::new(seeds))
        .with_verify_sample_size(config.verify_sample_size);
    let sink = Arc::new(FsArtifactSink::new(&config.artifacts_dir));
    info!("Artifacts will be written below {:?}", config.artifacts_dir);

    let orchestrator = QueryOrchestrator::new(classifier, engine, sink);

    match cli_args.command.unwrap_or(Command::Prompt) {
        Command::Prompt => prompt_loop(&orchestrator, cli_args.json).await,
        Command::Run { query } => run_query(&orchestrator, &query, cli_args.json).await,
        Command::SelfTest => {
            for query in SELF_TEST_QUERIES {
                run_query(&orchestrator, query, cli_args.json).await?;
            }
            Ok(())
        }
    }
}
