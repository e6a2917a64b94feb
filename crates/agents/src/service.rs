//! Retrieval-grounded chat.
//!
//! One chat turn: retrieve documents for the message, pass their contents to
//! the selected agent as grounding context, return the reply together with
//! the documents that grounded it.

use crate::router::AgentRouter;
use concierge_core::AppResult;
use concierge_knowledge::{format_context, QueryHit, Retriever};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Agent that answered
    pub agent: String,

    /// The agent's reply
    pub reply: String,

    /// Documents supplied as grounding context, closest first
    pub knowledge: Vec<QueryHit>,
}

/// Shared entry point for request handlers.
///
/// Cheap to share behind an `Arc`; retrieval runs in parallel across callers
/// and only the agent exchange is serialised, per agent.
#[derive(Debug)]
pub struct ChatService {
    retriever: Arc<Retriever>,
    router: Arc<AgentRouter>,
    top_k: usize,
}

impl ChatService {
    pub fn new(retriever: Arc<Retriever>, router: Arc<AgentRouter>, top_k: usize) -> Self {
        Self {
            retriever,
            router,
            top_k,
        }
    }

    /// Answer `message` with the named agent, or the default agent.
    ///
    /// Routing is checked before retrieval, so a bad agent name fails without
    /// calling the embedder. Retrieval errors are returned as-is and leave
    /// agent memory untouched.
    pub async fn chat(&self, message: &str, agent_name: Option<&str>) -> AppResult<ChatReply> {
        self.chat_with_k(message, agent_name, self.top_k).await
    }

    /// Same as [`ChatService::chat`] with an explicit retrieval depth.
    pub async fn chat_with_k(
        &self,
        message: &str,
        agent_name: Option<&str>,
        k: usize,
    ) -> AppResult<ChatReply> {
        let agent = self.router.resolve(agent_name)?;

        let knowledge = self.retriever.query(message, k).await?;
        let joined = format_context(&knowledge);
        let context = (!knowledge.is_empty()).then_some(joined.as_str());

        let reply = agent.respond(message, context)?;

        tracing::info!(
            agent = agent.name(),
            documents = knowledge.len(),
            "Chat turn completed"
        );

        Ok(ChatReply {
            agent: agent.name().to_string(),
            reply,
            knowledge,
        })
    }

    pub fn router(&self) -> &AgentRouter {
        &self.router
    }
}
