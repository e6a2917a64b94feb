//! Concierge CLI
//!
//! Local front end for the retrieval-grounded multi-agent chat core.
//! Loads the document directory, builds the index once, then answers
//! messages through the configured agents.

mod commands;
mod startup;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AgentsCommand, AskCommand, ChatCommand, SearchCommand};
use concierge_core::{config::AppConfig, logging, ConfigOverrides};
use std::path::PathBuf;

/// Concierge - document-grounded answers from named agents
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(about = "Document-grounded answers from named agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CONCIERGE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CONCIERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of documents to index
    #[arg(short, long, global = true, env = "CONCIERGE_DOCS_DIR")]
    docs: Option<PathBuf>,

    /// Embedding provider (trigram, ollama)
    #[arg(long, global = true, env = "CONCIERGE_EMBEDDING_PROVIDER")]
    embedding_provider: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true, env = "CONCIERGE_EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one message with retrieved context
    Ask(AskCommand),

    /// Retrieve documents without involving an agent
    Search(SearchCommand),

    /// Interactive chat session over stdin
    Chat(ChatCommand),

    /// List configured agents
    Agents(AgentsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_with(ConfigOverrides {
        workspace: cli.workspace,
        config_file: cli.config,
        docs_dir: cli.docs,
        embedding_provider: cli.embedding_provider,
        embedding_model: cli.embedding_model,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
    })
    .context("Failed to load configuration")?;

    logging::init_logging(config.log_level.as_deref(), config.no_color)
        .context("Failed to initialize logging")?;

    config.validate().context("Invalid configuration")?;

    tracing::info!("Concierge starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Documents: {:?}", config.docs_path());
    tracing::debug!(
        "Embedding: {} ({})",
        config.embedding.provider,
        config.embedding.model
    );

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Chat(_) => "chat",
        Commands::Agents(_) => "agents",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Agents(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("'{}' failed", command_name))
}
