//! Configuration management for Concierge.
//!
//! Configuration is merged from, in increasing precedence:
//! - Built-in defaults
//! - A YAML file (`.concierge/config.yaml` in the workspace, or `CONCIERGE_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Everything here is read once at startup; nothing is reloaded per request.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers the knowledge crate knows how to construct.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Upper bound on `embedding.maxRetries`.
pub const MAX_EMBEDDING_RETRIES: u32 = 10;

/// What the router does when a caller names an agent that is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownAgentPolicy {
    /// Fail the dispatch with `AppError::UnknownAgent`.
    #[default]
    Reject,
    /// Route to the default (first registered) agent and log a warning.
    FallbackToDefault,
}

/// Embedding model selection.
///
/// Missing keys in a YAML `embedding:` section fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Provider endpoint, if the provider talks to a server
    pub endpoint: Option<String>,

    /// Attempts per embedding request for remote providers
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            max_retries: 3,
        }
    }
}

impl EmbeddingConfig {
    /// Default model and dimensions for `provider`.
    ///
    /// Unknown providers keep the trigram model; `validate` rejects them.
    pub fn model_defaults(provider: &str) -> (&'static str, usize) {
        match provider {
            "ollama" => ("nomic-embed-text", 768),
            _ => ("trigram-v1", 384),
        }
    }

    /// Switch to another provider.
    ///
    /// Model and dimensions reset to that provider's defaults, since a model
    /// name only means something to the provider it belongs to.
    pub fn switch_provider(&mut self, provider: String) {
        if provider == self.provider {
            return;
        }
        let (model, dimensions) = Self::model_defaults(&provider);
        self.model = model.to_string();
        self.dimensions = dimensions;
        self.provider = provider;
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .concierge/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Directory holding the documents to index; relative paths resolve
    /// against the workspace
    pub docs_dir: PathBuf,

    /// File extensions eligible for loading (without the dot)
    pub extensions: Vec<String>,

    /// Embedding model selection
    pub embedding: EmbeddingConfig,

    /// Agent names in registration order; the first is the default agent
    pub agents: Vec<String>,

    /// Handlebars template for agent replies
    pub reply_template: String,

    /// Routing behaviour for unregistered agent names
    pub unknown_agent: UnknownAgentPolicy,

    /// Number of documents retrieved per message
    pub top_k: usize,

    /// Number of turns returned by an agent's recent-history view
    pub history_window: usize,

    /// Turns retained per chat session
    pub session_history: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Number of documents retrieved per message when not configured.
pub const DEFAULT_TOP_K: usize = 2;

/// Number of turns in a recent-history view when not configured.
pub const DEFAULT_RECENT_TURNS: usize = 10;

/// Default acknowledgment reply: names the agent and echoes the message.
pub const DEFAULT_REPLY_TEMPLATE: &str = "[{{agent}}] received: {{message}}";

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    workspace: Option<WorkspaceSection>,
    documents: Option<DocumentsSection>,
    embedding: Option<EmbeddingConfig>,
    agents: Option<AgentsSection>,
    retrieval: Option<RetrievalSection>,
    session: Option<SessionSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentsSection {
    dir: Option<String>,
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentsSection {
    names: Option<Vec<String>>,
    reply_template: Option<String>,
    unknown_agent: Option<UnknownAgentPolicy>,
    history_window: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionSection {
    history: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub docs_dir: Option<PathBuf>,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            docs_dir: PathBuf::from("docs"),
            extensions: vec!["txt".to_string()],
            embedding: EmbeddingConfig::default(),
            agents: vec!["support".to_string(), "product-expert".to_string()],
            reply_template: DEFAULT_REPLY_TEMPLATE.to_string(),
            unknown_agent: UnknownAgentPolicy::default(),
            top_k: DEFAULT_TOP_K,
            history_window: DEFAULT_RECENT_TURNS,
            session_history: 20,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file, environment variables
    /// and CLI flags. The CLI workspace and config file are applied before the
    /// YAML is read; every other flag overrides everything afterwards.
    ///
    /// Environment variables:
    /// - `CONCIERGE_WORKSPACE`: Override workspace path
    /// - `CONCIERGE_CONFIG`: Path to config file
    /// - `CONCIERGE_DOCS_DIR`: Document directory
    /// - `CONCIERGE_EMBEDDING_PROVIDER`: Embedding provider
    /// - `CONCIERGE_EMBEDDING_MODEL`: Embedding model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load_with(overrides: ConfigOverrides) -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CONCIERGE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("CONCIERGE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if let Some(ref workspace) = overrides.workspace {
            config.workspace = workspace.clone();
        }

        if let Some(ref config_file) = overrides.config_file {
            config.config_file = Some(config_file.clone());
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".concierge/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(docs_dir) = std::env::var("CONCIERGE_DOCS_DIR") {
            config.docs_dir = PathBuf::from(docs_dir);
        }

        if let Ok(provider) = std::env::var("CONCIERGE_EMBEDDING_PROVIDER") {
            config.embedding.switch_provider(provider);
        }

        if let Ok(model) = std::env::var("CONCIERGE_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config.with_overrides(overrides))
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(docs) = config_file.documents {
            if let Some(dir) = docs.dir {
                result.docs_dir = PathBuf::from(dir);
            }
            if let Some(extensions) = docs.extensions {
                result.extensions = extensions;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(agents) = config_file.agents {
            if let Some(names) = agents.names {
                result.agents = names;
            }
            if let Some(template) = agents.reply_template {
                result.reply_template = template;
            }
            if let Some(policy) = agents.unknown_agent {
                result.unknown_agent = policy;
            }
            if let Some(window) = agents.history_window {
                result.history_window = window;
            }
        }

        if let Some(top_k) = config_file.retrieval.and_then(|r| r.top_k) {
            result.top_k = top_k;
        }

        if let Some(history) = config_file.session.and_then(|s| s.history) {
            result.session_history = history;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged configuration from {:?}", path);

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        if let Some(docs_dir) = overrides.docs_dir {
            self.docs_dir = docs_dir;
        }

        if let Some(provider) = overrides.embedding_provider {
            self.embedding.switch_provider(provider);
        }

        if let Some(model) = overrides.embedding_model {
            self.embedding.model = model;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolved document directory.
    pub fn docs_path(&self) -> PathBuf {
        if self.docs_dir.is_absolute() {
            self.docs_dir.clone()
        } else {
            self.workspace.join(&self.docs_dir)
        }
    }

    /// Validate the configuration before any component is built.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(AppError::Config(
                "Embedding model identifier must not be empty".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.embedding.max_retries > MAX_EMBEDDING_RETRIES {
            return Err(AppError::Config(format!(
                "embedding.maxRetries must be at most {}",
                MAX_EMBEDDING_RETRIES
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be greater than zero".to_string(),
            ));
        }

        if self.history_window == 0 || self.session_history == 0 {
            return Err(AppError::Config(
                "History windows must be greater than zero".to_string(),
            ));
        }

        if self.agents.is_empty() {
            return Err(AppError::Config(
                "At least one agent must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.agents {
            if name.trim().is_empty() {
                return Err(AppError::Config("Agent names must not be empty".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(AppError::Config(format!(
                    "Agent '{}' is configured more than once",
                    name
                )));
            }
        }

        Ok(())
    }
}
