//! Conversation memory.
//!
//! An append-only log of turns. Callers see a bounded suffix through
//! `recent_turns`; storage is unbounded unless the memory was created with
//! [`ConversationMemory::bounded`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub use concierge_core::config::DEFAULT_RECENT_TURNS;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub message: String,
    /// When the turn was appended
    pub at: DateTime<Utc>,
}

/// Ordered log of conversation turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: VecDeque<ConversationTurn>,
    max_turns: Option<usize>,
}

impl ConversationMemory {
    /// Unbounded memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory that keeps only the newest `max_turns` turns.
    pub fn bounded(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns: Some(max_turns),
        }
    }

    /// Append a turn, evicting the oldest ones if the memory is bounded.
    pub fn append(&mut self, role: Role, message: impl Into<String>) {
        self.turns.push_back(ConversationTurn {
            role,
            message: message.into(),
            at: Utc::now(),
        });

        if let Some(max) = self.max_turns {
            while self.turns.len() > max {
                self.turns.pop_front();
            }
        }
    }

    /// The last `n` turns in chronological order; fewer if the history is shorter.
    pub fn recent_turns(&self, n: usize) -> Vec<ConversationTurn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).cloned().collect()
    }

    /// All retained turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
