//! Search command handler.

use crate::startup;
use clap::Args;
use concierge_core::{config::AppConfig, AppResult};

/// Retrieve documents without involving an agent
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of documents to retrieve (default: from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let retriever = startup::retriever(config).await?;
        let k = self.top_k.unwrap_or(config.top_k);
        let hits = retriever.query(&self.query, k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&hits)?);
            return Ok(());
        }

        if hits.is_empty() {
            println!(
                "No documents indexed ({} loaded from {:?})",
                retriever.document_count(),
                config.docs_path()
            );
            return Ok(());
        }

        for (rank, hit) in hits.iter().enumerate() {
            println!("{}. {} (distance {:.4})", rank + 1, hit.id, hit.score);
            println!("   {}", preview(&hit.content, 120));
        }

        Ok(())
    }
}

/// First line of `text`, cut to `max_chars`.
fn preview(text: &str, max_chars: usize) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut preview: String = line.chars().take(max_chars).collect();
    if line.chars().count() > max_chars {
        preview.push_str("...");
    }
    preview
}
