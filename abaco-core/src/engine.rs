//! The analytics engine: persona prompt construction and backend dispatch.
//!
//! An explicitly constructed service object — built once at startup and
//! shared behind an `Arc` — owning the persona catalog, the domain knowledge
//! base, and the backend client handle. Safe for concurrent read-only use
//! after construction.

use crate::backend::{GenerationOptions, GrokClient, TextBackend, generate_with_retry};
use crate::config::{AppConfig, RetryConfig};
use crate::personas::{AgentPersonality, PersonaCatalog, resolve_agent_kind};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn};

/// Context for one generation request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Task description woven into the prompt.
    pub task: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            task: "Perform standard analysis.".to_string(),
        }
    }
}

impl RequestContext {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }
}

/// Generates persona-driven responses by orchestrating calls to a
/// configurable text-generation backend.
pub struct AnalyticsEngine {
    catalog: PersonaCatalog,
    knowledge_base: Value,
    backend: Option<Arc<dyn TextBackend>>,
    retry: RetryConfig,
}

impl AnalyticsEngine {
    /// Build the engine from configuration.
    ///
    /// A missing backend credential is not fatal: the engine is constructed
    /// without a client and every generation returns a placeholder response.
    pub fn from_config(config: &AppConfig) -> Self {
        let backend: Option<Arc<dyn TextBackend>> = match GrokClient::new(&config.backend) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(
                    error = %e,
                    "Could not initialize backend client; responses will be placeholders"
                );
                None
            }
        };

        let knowledge_base = config
            .output
            .knowledge_base
            .as_deref()
            .map(load_knowledge_base)
            .unwrap_or_else(|| Value::Object(Default::default()));

        Self {
            catalog: PersonaCatalog::new(),
            knowledge_base,
            backend,
            retry: config.backend.retry.clone(),
        }
    }

    /// Build the engine over an explicit backend, for tests and embedding.
    pub fn with_backend(backend: Arc<dyn TextBackend>, retry: RetryConfig) -> Self {
        Self {
            catalog: PersonaCatalog::new(),
            knowledge_base: Value::Object(Default::default()),
            backend: Some(backend),
            retry,
        }
    }

    /// The persona catalog, read-only.
    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Whether a backend client is available.
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Generate a persona response for the given agent.
    ///
    /// Unknown agents and missing backends resolve to informative strings,
    /// never errors: a single misconfigured agent must not abort an
    /// orchestration run.
    pub async fn generate_response(
        &self,
        agent_id: &str,
        context: &RequestContext,
        data: &Value,
    ) -> String {
        let Some(kind) = resolve_agent_kind(agent_id) else {
            return format!(
                "[Abaco AI]: Analysis for {} in progress. Specialized handler not yet configured.",
                agent_id
            );
        };
        let Some(persona) = self.catalog.get(kind) else {
            return format!(
                "[Abaco AI]: Analysis for {} in progress. Specialized handler not yet configured.",
                agent_id
            );
        };

        let Some(ref backend) = self.backend else {
            return format!(
                "[Placeholder for {}]: backend client not initialized.",
                persona.name
            );
        };

        let prompt = self.construct_prompt(persona, context, data);
        generate_with_retry(
            backend.as_ref(),
            &prompt,
            &GenerationOptions::default(),
            &self.retry,
        )
        .await
    }

    /// Construct the persona prompt from personality metadata, the task
    /// context, and the JSON-rendered input data.
    fn construct_prompt(
        &self,
        persona: &AgentPersonality,
        context: &RequestContext,
        data: &Value,
    ) -> String {
        let rendered_data =
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());

        let mut prompt = format!(
            "You are {name}, the {position}.\n\
             Your characteristics: {traits}.\n\
             Your tone is: {tone}.\n\
             Your decision style is: {style}.\n\
             \n\
             Task: {task}\n\
             \n\
             Input Data:\n{data}",
            name = persona.name,
            position = persona.position,
            traits = persona.traits.join(", "),
            tone = persona.tone,
            style = persona.decision_style,
            task = context.task,
            data = rendered_data,
        );

        if self
            .knowledge_base
            .as_object()
            .is_some_and(|kb| !kb.is_empty())
        {
            let rendered_kb = serde_json::to_string_pretty(&self.knowledge_base)
                .unwrap_or_else(|_| self.knowledge_base.to_string());
            prompt.push_str(&format!("\n\nDomain Knowledge:\n{}", rendered_kb));
        }

        prompt.push_str("\n\nPlease generate a response in your persona.");
        prompt
    }
}

/// Load the domain knowledge base from a JSON file.
///
/// Load failures are logged and yield an empty knowledge base; generation
/// proceeds without domain context rather than failing startup.
fn load_knowledge_base(path: &Path) -> Value {
    match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Could not parse knowledge base");
                Value::Object(Default::default())
            }
        },
        Err(e) => {
            error!(path = %path.display(), error = %e, "Could not load knowledge base");
            Value::Object(Default::default())
        }
    }
}
