//! Message pipeline.
//!
//! One asynchronous pipeline per user-submitted message:
//! classify → route → complete (with at most one internal fallback) →
//! process → append to the session store. Single in-flight pipeline per
//! session, tracked by the store's advisory processing flag. No queue,
//! no cancellation, no timeouts.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use webpress_agents::AgentPersona;

use crate::classifier::classify;
use crate::error::ChatResult;
use crate::llm::{ChatCompletionBackend, CompletionClient, GenerativeBackend, KeySelector};
use crate::processor::process;
use crate::prompt::build_system_instruction;
use crate::router::{route, BackendKind};
use crate::session::SessionStore;
use crate::settings::AppSettings;
use crate::types::{Attachment, ChatMessage, RoutingStats};

/// Scripted guidance shown when no provider credential is configured
const SETUP_GUIDE: &str = "### 🚀 Let's Get Your Workspace Connected\n\
To enable the **Elementor-Native Orchestration**, you need to provide your OpenRouter API key. \
This \"Bring Your Own Key\" (BYOK) model keeps your costs transparent and at raw provider rates.\n\n\
1.  **OpenRouter Key** (Specialized Coding): Used to route coding tasks to high-performance \
models like Qwen 2.5 and Llama 3.1. [Get a key here](https://openrouter.ai/keys).\n\n\
**Head to the Settings tab** to enter your key. Once connected, I can start generating full \
Elementor widgets and templates for you instantly.";

/// Top-level chat pipeline. Owns the session store and settings; the
/// backends and the key selector are injected collaborators.
pub struct ChatPipeline {
    generative: Arc<dyn GenerativeBackend>,
    client: CompletionClient,
    store: SessionStore,
    settings: AppSettings,
}

impl ChatPipeline {
    /// Create a pipeline over the given backends
    pub fn new(
        chat: Arc<dyn ChatCompletionBackend>,
        generative: Arc<dyn GenerativeBackend>,
        keys: Arc<dyn KeySelector>,
        settings: AppSettings,
    ) -> Self {
        Self {
            generative: generative.clone(),
            client: CompletionClient::new(chat, generative, keys),
            store: SessionStore::new(),
            settings,
        }
    }

    /// Session state (history, context, processing flag)
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Current settings
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replace settings wholesale (the settings form saves the full blob)
    pub fn replace_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    /// Switch the active persona
    pub fn switch_agent(&mut self, agent: AgentPersona) {
        self.store.switch_agent(agent);
    }

    /// Handle one user message end to end.
    ///
    /// The user message is always appended first. Without a configured
    /// credential the pipeline short-circuits to the scripted setup
    /// message and makes no network calls. Otherwise the full pipeline
    /// runs; any uncaught stage error is rendered as a system message.
    /// The processing flag is cleared on every path.
    pub async fn send_message(
        &mut self,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> ChatResult<ChatMessage> {
        self.store.append(ChatMessage::user(text, attachments));

        if !self.settings.is_configured() {
            info!("no provider credential, returning setup guidance");
            // Scripted assistant guidance, not an error: rendered as an
            // AI message from the system persona
            let setup = ChatMessage::ai(SETUP_GUIDE, AgentPersona::System);
            self.store.append(setup.clone());
            return Ok(setup);
        }

        let started = Instant::now();
        self.store.set_processing(true);

        let message = match self.run_stages(text, started).await {
            Ok(message) => message,
            Err(e) => ChatMessage::system(format!("Error: {}", e)),
        };

        self.store.append(message.clone());
        self.store.set_processing(false);

        Ok(message)
    }

    // The fallible middle of the pipeline: classify → route → complete →
    // process → patch. Errors bubble up to send_message, which renders
    // them; the store mutations here happen only after a full success.
    async fn run_stages(&mut self, text: &str, started: Instant) -> ChatResult<ChatMessage> {
        let active_agent = self.store.active_agent();

        let classification = classify(
            self.generative.as_ref(),
            text,
            self.settings.use_pro_orchestrator,
        )
        .await?;
        debug!(
            category = classification.category.as_str(),
            confidence = classification.confidence,
            "classified task"
        );

        let decision = route(classification.category, active_agent, &self.settings);
        let system_instruction =
            build_system_instruction(classification.category, self.store.context());

        let completion = self
            .client
            .complete(&decision, text, &system_instruction, &self.settings)
            .await?;

        let processed = process(&completion.text, active_agent);
        if let Some(patch) = processed.patch {
            self.store.apply_patch(patch, active_agent);
        }

        // Backend-native generations are attributed to the designer persona
        let responding_agent = if decision.backend == BackendKind::Generative {
            AgentPersona::Visionary
        } else {
            active_agent
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        info!(
            model = %completion.model_id,
            latency_ms,
            artifacts = processed.artifacts.len(),
            "pipeline complete"
        );

        Ok(ChatMessage::ai(processed.cleaned_text, responding_agent)
            .with_artifacts(processed.artifacts)
            .with_routing(RoutingStats {
                model_id: completion.model_id,
                category: classification.category,
                confidence: classification.confidence,
                latency_ms,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChatError, ChatResult};
    use crate::llm::{AlwaysSelectedKeys, GenerativeRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChat {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatCompletionBackend for CountingChat {
        async fn complete(&self, _: &str, _: &str, _: &str) -> ChatResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("ok".to_string())
        }
    }

    struct CountingGenerative {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeBackend for CountingGenerative {
        async fn generate(&self, _: GenerativeRequest) -> ChatResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"category": "general", "confidence": 0.5}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let chat = Arc::new(CountingChat {
            calls: AtomicUsize::new(0),
        });
        let generative = Arc::new(CountingGenerative {
            calls: AtomicUsize::new(0),
        });
        let mut pipeline = ChatPipeline::new(
            chat.clone(),
            generative.clone(),
            Arc::new(AlwaysSelectedKeys),
            AppSettings::default(),
        );

        let reply = pipeline
            .send_message("Build a Real Estate CPT for Elementor.", Vec::new())
            .await
            .unwrap();

        assert!(reply.text.contains("OpenRouter API key"));
        // Scripted guidance is an assistant message from the system persona
        assert_eq!(reply.role, crate::types::MessageRole::Ai);
        assert_eq!(reply.agent, Some(AgentPersona::System));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 0);
        assert!(!pipeline.store().is_processing());
        // welcome + user + setup
        assert_eq!(pipeline.store().history().len(), 3);
    }

    #[tokio::test]
    async fn test_classifier_transport_error_becomes_system_message() {
        struct OfflineGenerative;

        #[async_trait]
        impl GenerativeBackend for OfflineGenerative {
            async fn generate(&self, _: GenerativeRequest) -> ChatResult<String> {
                Err(ChatError::Generative("offline".to_string()))
            }
        }

        let mut settings = AppSettings::default();
        settings.open_router_key = "sk-or-test".to_string();

        let mut pipeline = ChatPipeline::new(
            Arc::new(CountingChat {
                calls: AtomicUsize::new(0),
            }),
            Arc::new(OfflineGenerative),
            Arc::new(AlwaysSelectedKeys),
            settings,
        );

        let reply = pipeline.send_message("Build something", Vec::new()).await.unwrap();
        assert!(reply.text.starts_with("Error:"));
        assert_eq!(reply.role, crate::types::MessageRole::System);
        assert!(!pipeline.store().is_processing());
    }
}
