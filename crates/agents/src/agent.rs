//! Conversational agents.

use crate::memory::{ConversationMemory, ConversationTurn, Role};
use crate::template::ReplyTemplate;
use concierge_core::AppResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A named responder with its own conversation memory.
///
/// `respond` holds the agent's memory lock for the whole exchange, so
/// concurrent callers reaching the same agent are served one at a time and
/// every user turn is directly followed by its assistant turn.
#[derive(Debug)]
pub struct Agent {
    name: String,
    template: Arc<ReplyTemplate>,
    memory: Mutex<ConversationMemory>,
}

impl Agent {
    pub fn new(name: impl Into<String>, template: Arc<ReplyTemplate>) -> Self {
        Self {
            name: name.into(),
            template,
            memory: Mutex::new(ConversationMemory::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reply to `message`, recording both sides of the exchange.
    ///
    /// Nothing is recorded if the reply cannot be rendered.
    pub fn respond(&self, message: &str, context: Option<&str>) -> AppResult<String> {
        let mut memory = self.lock_memory();

        let reply = self.template.render(&self.name, message, context)?;

        memory.append(Role::User, message);
        memory.append(Role::Assistant, reply.as_str());

        tracing::debug!(
            agent = %self.name,
            turns = memory.len(),
            grounded = context.is_some(),
            "Agent replied"
        );

        Ok(reply)
    }

    /// The last `n` turns of this agent's conversation.
    pub fn recent_turns(&self, n: usize) -> Vec<ConversationTurn> {
        self.lock_memory().recent_turns(n)
    }

    pub fn turn_count(&self) -> usize {
        self.lock_memory().len()
    }

    fn lock_memory(&self) -> MutexGuard<'_, ConversationMemory> {
        // Appends cannot leave the log half-written, so a poisoned lock is still usable
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
