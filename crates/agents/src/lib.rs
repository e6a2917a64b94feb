//! Agents for Concierge.
//!
//! Named conversational agents with per-agent memory, a router that picks
//! the agent for each message, and the chat service that grounds every
//! reply in retrieved documents.

pub mod agent;
pub mod memory;
pub mod router;
pub mod service;
pub mod session;
pub mod template;

// Re-export commonly used types
pub use agent::Agent;
pub use memory::{ConversationMemory, ConversationTurn, Role, DEFAULT_RECENT_TURNS};
pub use router::AgentRouter;
pub use service::{ChatReply, ChatService};
pub use session::ChatSession;
pub use template::ReplyTemplate;

use concierge_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Build the agent router described by the configuration.
pub fn build_router(config: &AppConfig) -> AppResult<AgentRouter> {
    let template = Arc::new(ReplyTemplate::new(&config.reply_template)?);
    let router = AgentRouter::from_names(&config.agents, template, config.unknown_agent)?;

    tracing::info!(
        "Registered {} agents (default: {})",
        router.len(),
        router.default_agent().map(Agent::name).unwrap_or("none")
    );

    Ok(router)
}
