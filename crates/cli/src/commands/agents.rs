//! Agents command handler.

use clap::Args;
use concierge_agents::build_router;
use concierge_core::{config::AppConfig, AppResult};

/// List configured agents
#[derive(Args, Debug)]
pub struct AgentsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AgentsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let router = build_router(config)?;
        let names = router.names();

        if self.json {
            let output = serde_json::json!({
                "agents": names,
                "default": names.first(),
                "unknownAgent": router.policy(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        for (i, name) in names.iter().enumerate() {
            if i == 0 {
                println!("{} (default)", name);
            } else {
                println!("{}", name);
            }
        }

        Ok(())
    }
}
