//! Prompt-based arbiter backed by a [`ReasoningModel`].

use std::sync::Arc;

use async_trait::async_trait;
use minijinja::Environment;
use tracing::debug;

use crate::routing::{
    domain::{ArbitrationRequest, ArbitrationVerdict},
    ports::{Arbiter, ArbiterError, ArbiterResult, ReasoningModel},
};

/// Default arbitration prompt.
///
/// Rendered with the fields of [`ArbitrationRequest`].
pub const DEFAULT_ARBITRATION_TEMPLATE: &str = r#"You route user requests to specialised agents.
Select every agent needed to answer the request completely. Select more than
one agent only when the request spans several of their areas.

Session context: {{ context }}

User request: {{ query }}

Candidate agents:
{% for candidate in candidates -%}
[{{ candidate.index }}] {{ candidate.name }}: {{ candidate.description }}
{% endfor %}
Reply with a single JSON object and nothing else:
{"selected_indices": [<candidate numbers>], "reasoning": "<why>", "analysis": "<what the user needs>"}
"#;

/// Arbiter that renders a prompt and parses the model's JSON reply.
pub struct ReasoningArbiter<M>
where
    M: ReasoningModel,
{
    model: Arc<M>,
    template: String,
}

impl<M> ReasoningArbiter<M>
where
    M: ReasoningModel,
{
    /// Creates an arbiter using [`DEFAULT_ARBITRATION_TEMPLATE`].
    #[must_use]
    pub fn new(model: Arc<M>) -> Self {
        Self::with_template(model, DEFAULT_ARBITRATION_TEMPLATE)
    }

    /// Creates an arbiter with a custom `minijinja` template.
    #[must_use]
    pub fn with_template(model: Arc<M>, template: impl Into<String>) -> Self {
        Self {
            model,
            template: template.into(),
        }
    }

    /// Renders the prompt for a request.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError::Prompt`] when the template fails to render.
    pub fn render_prompt(&self, request: &ArbitrationRequest) -> ArbiterResult<String> {
        Environment::new()
            .render_str(&self.template, request)
            .map_err(|err| ArbiterError::Prompt(err.to_string()))
    }
}

#[async_trait]
impl<M> Arbiter for ReasoningArbiter<M>
where
    M: ReasoningModel,
{
    async fn arbitrate(&self, request: &ArbitrationRequest) -> ArbiterResult<ArbitrationVerdict> {
        let prompt = self.render_prompt(request)?;
        let reply = self.model.complete(&prompt).await?;
        debug!(reply_len = reply.len(), "arbitration reply received");
        parse_verdict(&reply)
    }
}

/// Parses a verdict from model output.
///
/// The first balanced JSON object in the text is used, so Markdown code
/// fences and surrounding prose are ignored.
///
/// # Errors
///
/// Returns [`ArbiterError::MalformedReply`] when no object is found or it
/// does not decode as a verdict.
pub fn parse_verdict(reply: &str) -> ArbiterResult<ArbitrationVerdict> {
    let object = extract_json_object(reply).ok_or_else(|| {
        ArbiterError::MalformedReply(format!(
            "no JSON object in reply: {}",
            reply.chars().take(200).collect::<String>()
        ))
    })?;
    serde_json::from_str(object).map_err(|err| ArbiterError::MalformedReply(err.to_string()))
}

/// Returns the first balanced `{...}` object, ignoring braces in strings.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let tail = text.get(start..)?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in tail.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return tail.get(..=offset);
                }
            }
            _ => {}
        }
    }
    None
}
