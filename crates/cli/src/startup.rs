//! One-shot initialisation shared by the commands.
//!
//! Everything is built before the first message is answered; any error here
//! aborts the command rather than serving from a partial index.

use concierge_agents::{build_router, ChatService};
use concierge_core::{AppConfig, AppResult};
use concierge_knowledge::{build_retriever, Retriever};
use std::sync::Arc;

/// Load documents and build the index.
pub async fn retriever(config: &AppConfig) -> AppResult<Retriever> {
    build_retriever(&config.docs_path(), &config.extensions, &config.embedding).await
}

/// Build the retriever and agents and wire them into a chat service.
pub async fn chat_service(config: &AppConfig) -> AppResult<ChatService> {
    let router = build_router(config)?;
    let retriever = retriever(config).await?;
    Ok(ChatService::new(
        Arc::new(retriever),
        Arc::new(router),
        config.top_k,
    ))
}
