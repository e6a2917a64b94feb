//! Agent registry and message dispatch.

use crate::agent::Agent;
use crate::template::ReplyTemplate;
use concierge_core::{AppError, AppResult, UnknownAgentPolicy};
use std::collections::HashMap;
use std::sync::Arc;

/// Named registry of agents.
///
/// The first registered agent is the default: it answers every dispatch
/// that does not name an agent.
#[derive(Debug, Default)]
pub struct AgentRouter {
    agents: Vec<Agent>,
    positions: HashMap<String, usize>,
    policy: UnknownAgentPolicy,
}

impl AgentRouter {
    pub fn new(policy: UnknownAgentPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Register one agent per name, in order, all sharing `template`.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        template: Arc<ReplyTemplate>,
        policy: UnknownAgentPolicy,
    ) -> AppResult<Self> {
        let mut router = Self::new(policy);
        for name in names {
            router.register(Agent::new(name.as_ref(), Arc::clone(&template)))?;
        }
        Ok(router)
    }

    /// Add an agent under its own name.
    ///
    /// # Errors
    /// * `AppError::DuplicateAgent` - If an agent with that name is already registered
    pub fn register(&mut self, agent: Agent) -> AppResult<()> {
        if self.positions.contains_key(agent.name()) {
            return Err(AppError::DuplicateAgent(agent.name().to_string()));
        }

        tracing::debug!(
            "Registered agent '{}' at position {}",
            agent.name(),
            self.agents.len()
        );
        self.positions
            .insert(agent.name().to_string(), self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    /// Route `message` to the named agent, or to the default agent.
    pub fn dispatch(&self, message: &str, agent_name: Option<&str>) -> AppResult<String> {
        self.dispatch_with_context(message, None, agent_name)
    }

    /// Route `message` with grounding context.
    pub fn dispatch_with_context(
        &self,
        message: &str,
        context: Option<&str>,
        agent_name: Option<&str>,
    ) -> AppResult<String> {
        self.resolve(agent_name)?.respond(message, context)
    }

    /// Pick the agent a dispatch would go to.
    ///
    /// # Errors
    /// * `AppError::UnknownAgent` - If the name is not registered and the
    ///   policy is `Reject`, or if no agents are registered at all
    pub fn resolve(&self, agent_name: Option<&str>) -> AppResult<&Agent> {
        let Some(name) = agent_name else {
            return self.default_agent_or_err("<default>");
        };

        if let Some(&position) = self.positions.get(name) {
            return Ok(&self.agents[position]);
        }

        match self.policy {
            UnknownAgentPolicy::Reject => Err(AppError::UnknownAgent(name.to_string())),
            UnknownAgentPolicy::FallbackToDefault => {
                let agent = self.default_agent_or_err(name)?;
                tracing::warn!(
                    "Unknown agent '{}', falling back to default agent '{}'",
                    name,
                    agent.name()
                );
                Ok(agent)
            }
        }
    }

    fn default_agent_or_err(&self, requested: &str) -> AppResult<&Agent> {
        self.default_agent()
            .ok_or_else(|| AppError::UnknownAgent(requested.to_string()))
    }

    /// The first registered agent.
    pub fn default_agent(&self) -> Option<&Agent> {
        self.agents.first()
    }

    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.positions.get(name).map(|&position| &self.agents[position])
    }

    /// Agent names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(Agent::name).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn policy(&self) -> UnknownAgentPolicy {
        self.policy
    }
}
