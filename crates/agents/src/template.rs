//! Reply templates.
//!
//! Agents render their replies from a Handlebars template with three
//! variables: `agent`, `message` and `context` (empty when no grounding
//! context was retrieved).

use concierge_core::{AppError, AppResult};
use handlebars::Handlebars;

pub use concierge_core::config::DEFAULT_REPLY_TEMPLATE;

const TEMPLATE_NAME: &str = "reply";

/// A compiled reply template, shareable between agents.
#[derive(Debug)]
pub struct ReplyTemplate {
    registry: Handlebars<'static>,
}

impl ReplyTemplate {
    /// Compile `source`.
    ///
    /// # Errors
    /// * `AppError::Template` - If the template does not parse
    pub fn new(source: &str) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Replies are plain text
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| AppError::Template(format!("Failed to register template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Render a reply.
    pub fn render(&self, agent: &str, message: &str, context: Option<&str>) -> AppResult<String> {
        let data = serde_json::json!({
            "agent": agent,
            "message": message,
            "context": context.unwrap_or(""),
        });

        self.registry
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| AppError::Template(format!("Failed to render template: {}", e)))
    }
}
