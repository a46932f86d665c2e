//! LLM backends and the completion client.
//!
//! Two backend shapes are supported: an OpenRouter-compatible chat
//! completion API and a generateContent-style generative API. Both sit
//! behind traits so tests can substitute stubs, as does the interactive
//! key-selection collaborator required by the paid image tier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChatError, ChatResult};
use crate::router::{orchestrator_model, BackendKind, Route, DESIGNER_IMAGE_PRO};
use crate::settings::AppSettings;

/// External chat-completion provider
#[async_trait]
pub trait ChatCompletionBackend: Send + Sync {
    /// One system + user exchange, returning the assistant text
    async fn complete(
        &self,
        model: &str,
        system_instruction: &str,
        user_text: &str,
    ) -> ChatResult<String>;
}

/// Request shape for the generative backend
#[derive(Debug, Clone)]
pub struct GenerativeRequest {
    pub model: String,
    pub contents: String,
    pub system_instruction: Option<String>,
    /// Constrain the response to strict JSON
    pub json_response: bool,
}

/// Generative completion backend (generateContent-style API)
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: GenerativeRequest) -> ChatResult<String>;
}

/// Interactive out-of-band key selection for paid model tiers.
/// Injected so the host UI can open its dialog and tests can stub it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeySelector: Send + Sync {
    async fn has_selected_key(&self) -> bool;
    async fn open_select_key(&self) -> ChatResult<()>;
}

/// Key selector for headless hosts: always reports a selected key
pub struct AlwaysSelectedKeys;

#[async_trait]
impl KeySelector for AlwaysSelectedKeys {
    async fn has_selected_key(&self) -> bool {
        true
    }

    async fn open_select_key(&self) -> ChatResult<()> {
        Ok(())
    }
}

// =============================================================================
// OpenRouter client
// =============================================================================

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const CLIENT_TITLE: &str = "WebPress Architect";

/// Chat-completion client for the OpenRouter API
pub struct OpenRouterClient {
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    /// Create a client with an explicit credential
    pub fn new(api_key: impl Into<String>) -> ChatResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::NotConfigured);
        }
        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl ChatCompletionBackend for OpenRouterClient {
    async fn complete(
        &self,
        model: &str,
        system_instruction: &str,
        user_text: &str,
    ) -> ChatResult<String> {
        let request = OpenRouterRequest {
            model: model.to_string(),
            messages: vec![
                OpenRouterMessage {
                    role: "system".to_string(),
                    content: system_instruction.to_string(),
                },
                OpenRouterMessage {
                    role: "user".to_string(),
                    content: user_text.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", CLIENT_TITLE)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies carry {"error": {"message": ...}}
            let message = response
                .json::<OpenRouterErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.error.map(|inner| inner.message))
                .unwrap_or_else(|| "OpenRouter request failed".to_string());
            return Err(ChatError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let result: OpenRouterResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Network(format!("Failed to parse response: {}", e)))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Provider {
                status: status.as_u16(),
                message: "No choices in response".to_string(),
            })
    }
}

// OpenRouter API types
#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<OpenRouterMessage>,
}

#[derive(Debug, Serialize)]
struct OpenRouterMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Vec<OpenRouterChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenRouterErrorResponse {
    error: Option<OpenRouterErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterErrorBody {
    message: String,
}

// =============================================================================
// Gemini client
// =============================================================================

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generative client for the Gemini generateContent API
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> ChatResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::NotConfigured);
        }
        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: GenerativeRequest) -> ChatResult<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, request.model, self.api_key
        );

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.contents,
                }],
            }],
            system_instruction: request.system_instruction.map(|text| GeminiContent {
                parts: vec![GeminiPart { text }],
            }),
            generation_config: request.json_response.then(|| GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Generative(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let result: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Generative(format!("Failed to parse response: {}", e)))?;

        result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ChatError::Generative("No candidates in response".to_string()))
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

// =============================================================================
// Completion client
// =============================================================================

/// Suffix recorded on the model id when the fallback path produced
/// the response
pub const FALLBACK_SUFFIX: &str = " (Fallback)";

/// A completed response with the model that actually produced it
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model_id: String,
}

/// Adapts a routing decision onto one of the two backend call shapes,
/// with a single fallback from the chat provider to the generative
/// backend at the configured orchestrator tier.
pub struct CompletionClient {
    chat: std::sync::Arc<dyn ChatCompletionBackend>,
    generative: std::sync::Arc<dyn GenerativeBackend>,
    keys: std::sync::Arc<dyn KeySelector>,
}

impl CompletionClient {
    pub fn new(
        chat: std::sync::Arc<dyn ChatCompletionBackend>,
        generative: std::sync::Arc<dyn GenerativeBackend>,
        keys: std::sync::Arc<dyn KeySelector>,
    ) -> Self {
        Self {
            chat,
            generative,
            keys,
        }
    }

    /// Execute a routed completion.
    ///
    /// Generative routes call the backend directly (after key selection
    /// for the paid image tier). Chat routes fall back once to the
    /// generative backend on any provider failure; fallback failures
    /// propagate to the caller.
    pub async fn complete(
        &self,
        route: &Route,
        user_text: &str,
        system_instruction: &str,
        settings: &AppSettings,
    ) -> ChatResult<Completion> {
        match route.backend {
            BackendKind::Generative => {
                if route.model_id == DESIGNER_IMAGE_PRO && !self.keys.has_selected_key().await {
                    self.keys.open_select_key().await?;
                }
                let text = self
                    .generative
                    .generate(GenerativeRequest {
                        model: route.model_id.clone(),
                        contents: user_text.to_string(),
                        system_instruction: Some(system_instruction.to_string()),
                        json_response: false,
                    })
                    .await?;
                Ok(Completion {
                    text,
                    model_id: route.model_id.clone(),
                })
            }
            BackendKind::ChatCompletion => {
                match self
                    .chat
                    .complete(&route.model_id, system_instruction, user_text)
                    .await
                {
                    Ok(text) => Ok(Completion {
                        text,
                        model_id: route.model_id.clone(),
                    }),
                    Err(primary) => {
                        let orchestrator = orchestrator_model(settings);
                        warn!(
                            model = %route.model_id,
                            error = %primary,
                            fallback = orchestrator,
                            "chat completion failed, falling back to orchestrator"
                        );
                        let text = self
                            .generative
                            .generate(GenerativeRequest {
                                model: orchestrator.to_string(),
                                contents: user_text.to_string(),
                                system_instruction: Some(system_instruction.to_string()),
                                json_response: false,
                            })
                            .await?;
                        Ok(Completion {
                            text,
                            model_id: format!("{}{}", orchestrator, FALLBACK_SUFFIX),
                        })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{DESIGNER_IMAGE_STANDARD, ORCHESTRATOR_FLASH, PHP_CODING_MODEL};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticChat(&'static str);

    #[async_trait]
    impl ChatCompletionBackend for StaticChat {
        async fn complete(&self, _: &str, _: &str, _: &str) -> ChatResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatCompletionBackend for FailingChat {
        async fn complete(&self, _: &str, _: &str, _: &str) -> ChatResult<String> {
            Err(ChatError::Provider {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct StaticGenerative {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl StaticGenerative {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for StaticGenerative {
        async fn generate(&self, _: GenerativeRequest) -> ChatResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    fn chat_route(model: &str) -> Route {
        Route {
            backend: BackendKind::ChatCompletion,
            model_id: model.to_string(),
        }
    }

    #[tokio::test]
    async fn test_chat_route_uses_provider() {
        let client = CompletionClient::new(
            Arc::new(StaticChat("from provider")),
            Arc::new(StaticGenerative::new("unused")),
            Arc::new(AlwaysSelectedKeys),
        );
        let completion = client
            .complete(
                &chat_route(PHP_CODING_MODEL),
                "task",
                "sys",
                &AppSettings::default(),
            )
            .await
            .unwrap();
        assert_eq!(completion.text, "from provider");
        assert_eq!(completion.model_id, PHP_CODING_MODEL);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_once() {
        let generative = Arc::new(StaticGenerative::new("from fallback"));
        let client = CompletionClient::new(
            Arc::new(FailingChat),
            generative.clone(),
            Arc::new(AlwaysSelectedKeys),
        );
        let completion = client
            .complete(
                &chat_route(PHP_CODING_MODEL),
                "task",
                "sys",
                &AppSettings::default(),
            )
            .await
            .unwrap();
        assert_eq!(completion.text, "from fallback");
        assert_eq!(
            completion.model_id,
            format!("{}{}", ORCHESTRATOR_FLASH, FALLBACK_SUFFIX)
        );
        assert_eq!(generative.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generative_route_bypasses_provider() {
        let generative = Arc::new(StaticGenerative::new("designed"));
        let client = CompletionClient::new(
            Arc::new(FailingChat),
            generative.clone(),
            Arc::new(AlwaysSelectedKeys),
        );
        let route = Route {
            backend: BackendKind::Generative,
            model_id: DESIGNER_IMAGE_STANDARD.to_string(),
        };
        let completion = client
            .complete(&route, "task", "sys", &AppSettings::default())
            .await
            .unwrap();
        assert_eq!(completion.text, "designed");
        assert_eq!(completion.model_id, DESIGNER_IMAGE_STANDARD);
    }

    #[tokio::test]
    async fn test_pro_image_model_triggers_key_selection() {
        let mut keys = MockKeySelector::new();
        keys.expect_has_selected_key().times(1).return_const(false);
        keys.expect_open_select_key()
            .times(1)
            .returning(|| Ok(()));

        let client = CompletionClient::new(
            Arc::new(StaticChat("unused")),
            Arc::new(StaticGenerative::new("designed")),
            Arc::new(keys),
        );
        let route = Route {
            backend: BackendKind::Generative,
            model_id: DESIGNER_IMAGE_PRO.to_string(),
        };
        client
            .complete(&route, "task", "sys", &AppSettings::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_standard_image_model_skips_key_selection() {
        let mut keys = MockKeySelector::new();
        keys.expect_has_selected_key().never();
        keys.expect_open_select_key().never();

        let client = CompletionClient::new(
            Arc::new(StaticChat("unused")),
            Arc::new(StaticGenerative::new("designed")),
            Arc::new(keys),
        );
        let route = Route {
            backend: BackendKind::Generative,
            model_id: DESIGNER_IMAGE_STANDARD.to_string(),
        };
        let completion = client
            .complete(&route, "task", "sys", &AppSettings::default())
            .await
            .unwrap();
        assert_eq!(completion.model_id, DESIGNER_IMAGE_STANDARD);
    }
}
