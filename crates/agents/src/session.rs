//! Per-connection chat sessions.

use crate::memory::{ConversationMemory, ConversationTurn, Role};
use crate::service::{ChatReply, ChatService};
use concierge_core::AppResult;
use std::sync::Arc;
use uuid::Uuid;

/// A single client's conversation with the service.
///
/// Keeps its own rolling window of turns, independent of the agents'
/// memories, so a long-lived connection cannot grow without bound.
#[derive(Debug)]
pub struct ChatSession {
    id: Uuid,
    service: Arc<ChatService>,
    agent: Option<String>,
    history: ConversationMemory,
}

impl ChatSession {
    pub fn new(service: Arc<ChatService>, agent: Option<String>, max_turns: usize) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, max_turns, "Chat session opened");
        Self {
            id,
            service,
            agent,
            history: ConversationMemory::bounded(max_turns),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn service(&self) -> &ChatService {
        &self.service
    }

    /// Agent this session talks to; `None` means the default agent.
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// Send one message. Failed turns are not recorded.
    #[tracing::instrument(skip(self, message), fields(session = %self.id))]
    pub async fn send(&mut self, message: &str) -> AppResult<ChatReply> {
        let reply = self.service.chat(message, self.agent.as_deref()).await?;

        self.history.append(Role::User, message);
        self.history.append(Role::Assistant, reply.reply.as_str());

        Ok(reply)
    }

    /// The session's retained turns, oldest first.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.history.recent_turns(self.history.len())
    }
}
