//! Ask command handler.
//!
//! Answers a single message: retrieve context, dispatch to an agent, print.

use crate::startup;
use clap::Args;
use concierge_core::{config::AppConfig, AppResult};

/// Answer one message with retrieved context
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The message to answer
    pub message: String,

    /// Agent to answer (default: first configured agent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Number of documents to retrieve (default: from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        let service = startup::chat_service(config).await?;
        let k = self.top_k.unwrap_or(config.top_k);

        let reply = service
            .chat_with_k(&self.message, self.agent.as_deref(), k)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            return Ok(());
        }

        println!("{}", reply.reply);
        if !reply.knowledge.is_empty() {
            println!();
            println!("Sources:");
            for hit in &reply.knowledge {
                println!("  {} (distance {:.4})", hit.id, hit.score);
            }
        }

        Ok(())
    }
}
