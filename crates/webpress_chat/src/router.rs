//! Model routing.
//!
//! A pure decision table mapping (category, active persona, settings) to
//! a backend and model id. Category picks the default coding model; the
//! frontend/designer axis can override it onto the generative backend.
//! No randomness: same inputs always produce the same route.

use serde::{Deserialize, Serialize};
use webpress_agents::AgentPersona;

use crate::settings::AppSettings;
use crate::types::TaskCategory;

// Chat-completion provider model ids
pub const PHP_CODING_MODEL: &str = "qwen/qwen-2.5-7b-instruct:free";
pub const GENERAL_MODEL: &str = "mistral/mistral-7b-instruct:free";
pub const DEFAULT_CODING_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";
pub const FRONTEND_TEXT_MODEL: &str = "google/gemma-2-9b-it:free";

// Generative backend model ids
pub const ORCHESTRATOR_FLASH: &str = "gemini-3-flash-preview";
pub const ORCHESTRATOR_PRO: &str = "gemini-3-pro-preview";
pub const DESIGNER_IMAGE_STANDARD: &str = "gemini-2.5-flash-image";
pub const DESIGNER_IMAGE_PRO: &str = "gemini-3-pro-image-preview";

/// Which backend handles the completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// External chat-completion provider (OpenRouter)
    ChatCompletion,
    /// Backend-native generative call, bypassing the chat provider
    Generative,
}

/// Routing decision for one message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub backend: BackendKind,
    pub model_id: String,
}

/// Orchestrator model tier for classification and fallback completion
pub fn orchestrator_model(settings: &AppSettings) -> &'static str {
    if settings.use_pro_orchestrator {
        ORCHESTRATOR_PRO
    } else {
        ORCHESTRATOR_FLASH
    }
}

/// Route a classified task to a backend and model.
///
/// Decision order: category picks a default chat-provider model, then the
/// frontend/designer axis (frontend_css category OR Visionary persona)
/// either redirects to the generative image backend (when the image agent
/// or pro designer toggle is on) or downgrades to the free frontend text
/// model.
pub fn route(category: TaskCategory, active_agent: AgentPersona, settings: &AppSettings) -> Route {
    let mut model_id = match category {
        TaskCategory::PhpLogic => PHP_CODING_MODEL,
        TaskCategory::General => GENERAL_MODEL,
        _ => DEFAULT_CODING_MODEL,
    };

    if category == TaskCategory::FrontendCss || active_agent == AgentPersona::Visionary {
        if settings.use_image_agent || settings.use_pro_designer {
            let designer = if settings.use_pro_designer {
                DESIGNER_IMAGE_PRO
            } else {
                DESIGNER_IMAGE_STANDARD
            };
            return Route {
                backend: BackendKind::Generative,
                model_id: designer.to_string(),
            };
        }
        model_id = FRONTEND_TEXT_MODEL;
    }

    Route {
        backend: BackendKind::ChatCompletion,
        model_id: model_id.to_string(),
    }
}
