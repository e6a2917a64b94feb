//! Chat command handler.
//!
//! Reads one message per line from stdin and answers each through a
//! `ChatSession`. Lines starting with `/` are session commands.

use crate::startup;
use clap::Args;
use concierge_agents::ChatSession;
use concierge_core::{config::AppConfig, AppResult};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive chat session over stdin
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Agent to talk to (default: first configured agent)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Show the retrieved documents after each reply
    #[arg(long)]
    pub show_sources: bool,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let service = Arc::new(startup::chat_service(config).await?);
        // Fail on a bad agent name now rather than on the first message
        service.router().resolve(self.agent.as_deref())?;

        let mut session = ChatSession::new(service, self.agent.clone(), config.session_history);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        eprintln!(
            "Type a message. /history shows this session, /memory the agent's recent turns, /quit exits."
        );
        prompt();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();

            match line {
                "" => {}
                "/quit" | "/exit" => break,
                "/history" => {
                    for turn in session.history() {
                        println!("{:>9}: {}", turn.role, turn.message);
                    }
                }
                "/memory" => {
                    let agent = session.service().router().resolve(session.agent())?;
                    for turn in agent.recent_turns(config.history_window) {
                        println!("{:>9}: {}", turn.role, turn.message);
                    }
                }
                message => match session.send(message).await {
                    Ok(reply) => {
                        println!("{}", reply.reply);
                        if self.show_sources {
                            for hit in &reply.knowledge {
                                println!("  - {} (distance {:.4})", hit.id, hit.score);
                            }
                        }
                    }
                    // One failed message does not end the session
                    Err(e) => {
                        tracing::warn!("Message failed: {}", e);
                        eprintln!("error: {}", e);
                    }
                },
            }

            prompt();
        }

        tracing::info!(session = %session.id(), "Chat session closed");
        Ok(())
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
