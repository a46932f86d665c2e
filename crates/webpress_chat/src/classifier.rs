//! Intent classification.
//!
//! One generative-backend call with a fixed prompt enumerating the five
//! task categories, requesting a strict JSON reply. Parse failures fail
//! open to a safe default; transport errors propagate to the pipeline,
//! which renders them as a system message.

use serde::Deserialize;
use tracing::debug;

use crate::error::ChatResult;
use crate::llm::{GenerativeBackend, GenerativeRequest};
use crate::router::{ORCHESTRATOR_FLASH, ORCHESTRATOR_PRO};
use crate::types::TaskCategory;

/// A classified user task
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: TaskCategory,
    /// Confidence in 0.0..=1.0
    pub confidence: f64,
}

impl Classification {
    /// Safe default used when the classifier reply cannot be parsed
    pub fn fallback() -> Self {
        Self {
            category: TaskCategory::General,
            confidence: 0.5,
        }
    }
}

// Wire shape of the classifier reply
#[derive(Debug, Deserialize)]
struct ClassificationWire {
    category: TaskCategory,
    confidence: f64,
}

/// Classify a user task into one of the five categories.
///
/// The orchestrator tier is selected by the caller-supplied flag. The
/// JSON reply is parsed as an explicit `Result`; a malformed reply is
/// deliberately replaced with [`Classification::fallback`].
pub async fn classify(
    backend: &dyn GenerativeBackend,
    text: &str,
    use_pro_orchestrator: bool,
) -> ChatResult<Classification> {
    let model = if use_pro_orchestrator {
        ORCHESTRATOR_PRO
    } else {
        ORCHESTRATOR_FLASH
    };

    let prompt = format!(
        "Classify this WordPress dev task into exactly one category: \
         architecture, php_logic, frontend_css, security_review, or general.\n\
         Input: \"{}\"\n\
         Return ONLY valid JSON: {{\"category\": \"category\", \"confidence\": 0.0 to 1.0}}",
        text
    );

    let raw = backend
        .generate(GenerativeRequest {
            model: model.to_string(),
            contents: prompt,
            system_instruction: None,
            json_response: true,
        })
        .await?;

    let classification = match parse_classification(&raw) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "classifier reply unparsable, failing open to general");
            Classification::fallback()
        }
    };

    Ok(classification)
}

/// Parse a strict-JSON classifier reply, clamping confidence into range
fn parse_classification(raw: &str) -> Result<Classification, serde_json::Error> {
    let wire: ClassificationWire = serde_json::from_str(raw.trim())?;
    Ok(Classification {
        category: wire.category,
        confidence: wire.confidence.clamp(0.0, 1.0),
    })
}
