//! Command handlers for the Concierge CLI.

pub mod agents;
pub mod ask;
pub mod chat;
pub mod search;

pub use agents::AgentsCommand;
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use search::SearchCommand;
