//! Core types for the WebPress Architect chat core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use webpress_agents::AgentPersona;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
    System,
}

/// Task categories the orchestrator classifies into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Architecture,
    PhpLogic,
    FrontendCss,
    SecurityReview,
    General,
}

impl TaskCategory {
    /// All categories, in classification-prompt order
    pub const ALL: [TaskCategory; 5] = [
        Self::Architecture,
        Self::PhpLogic,
        Self::FrontendCss,
        Self::SecurityReview,
        Self::General,
    ];

    /// Wire name, matching the classification prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::PhpLogic => "php_logic",
            Self::FrontendCss => "frontend_css",
            Self::SecurityReview => "security_review",
            Self::General => "general",
        }
    }
}

/// Routing metadata attached to each AI-generated message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingStats {
    /// Backend/model identifier, `" (Fallback)"`-suffixed when the
    /// fallback path produced the response
    pub model_id: String,
    /// Classified task category
    pub category: TaskCategory,
    /// Classifier confidence, clamped to 0.0..=1.0
    pub confidence: f64,
    /// Wall-clock latency of the whole pipeline in milliseconds
    pub latency_ms: u64,
}

/// Kind of extracted artifact
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Code,
    Preview,
    Data,
}

/// A code or data artifact extracted from a model response.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub title: String,
    pub content: String,
    /// Result of the static security scan, if one ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_pass: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_issues: Vec<String>,
}

/// Kind of user-supplied attachment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Text,
}

/// A file the user attached to a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Base64 for images, plain text otherwise
    pub content: String,
    pub mime_type: String,
    pub name: String,
}

/// A single chat message. Immutable once appended to the session store;
/// insertion order is display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID (UUID)
    pub id: String,
    pub role: MessageRole,
    /// Originating persona (AI and system messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentPersona>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingStats>,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            agent: None,
            text: text.into(),
            timestamp: Utc::now(),
            artifacts: Vec::new(),
            attachments,
            routing: None,
        }
    }

    /// Create a new AI message attributed to a persona
    pub fn ai(text: impl Into<String>, agent: AgentPersona) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Ai,
            agent: Some(agent),
            text: text.into(),
            timestamp: Utc::now(),
            artifacts: Vec::new(),
            attachments: Vec::new(),
            routing: None,
        }
    }

    /// Create a new system message (setup guidance, errors)
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::System,
            agent: Some(AgentPersona::System),
            text: text.into(),
            timestamp: Utc::now(),
            artifacts: Vec::new(),
            attachments: Vec::new(),
            routing: None,
        }
    }

    /// Attach extracted artifacts
    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Attach routing metadata
    pub fn with_routing(mut self, routing: RoutingStats) -> Self {
        self.routing = Some(routing);
        self
    }
}

/// Page layout variants supported by the Elementor preview
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PageLayout {
    Boxed,
    FullWidth,
}

/// Layout settings inside a structure record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    /// Elementor standard default is 1140
    pub content_width: u32,
    /// Elementor standard default is 20
    #[serde(default = "default_widgets_space")]
    pub widgets_space: u32,
    pub page_layout: PageLayout,
}

fn default_widgets_space() -> u32 {
    20
}

/// Primary/secondary color pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorPair {
    pub primary: String,
    pub secondary: String,
}

/// The site/plugin shape produced by the Architect persona.
/// KB payloads are partial, so list fields default to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteStructure {
    #[serde(default)]
    pub plugin_name: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Custom post types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxonomies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_settings: Option<LayoutSettings>,
}

/// Copy deck accumulated from the Copywriter persona. All fields are
/// optional; no merge is wired up for it yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CopyDeck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_copy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
}

/// Visual direction accumulated from the Visionary persona
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visuals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_pairing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_layout: Option<PageLayout>,
}

/// The session's accumulated structured knowledge.
///
/// Structure is set only by the Architect persona; visuals and copy
/// fields take display precedence over same-named fields inside the
/// structure record (last-writer-wins per sub-field).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub structure: Option<SiteStructure>,
    #[serde(default)]
    pub copy_deck: CopyDeck,
    #[serde(default)]
    pub visuals: Visuals,
    pub last_agent_update: Option<AgentPersona>,
}

impl ProjectContext {
    /// Content width for display: visuals override the structure record
    pub fn effective_content_width(&self) -> Option<u32> {
        self.visuals.content_width.or_else(|| {
            self.structure
                .as_ref()
                .and_then(|s| s.layout_settings.as_ref())
                .map(|l| l.content_width)
        })
    }

    /// Page layout for display: visuals override the structure record
    pub fn effective_page_layout(&self) -> Option<PageLayout> {
        self.visuals.page_layout.or_else(|| {
            self.structure
                .as_ref()
                .and_then(|s| s.layout_settings.as_ref())
                .map(|l| l.page_layout)
        })
    }

    /// Primary color for display: visuals override the structure record
    pub fn effective_primary_color(&self) -> Option<&str> {
        self.visuals
            .primary_color
            .as_deref()
            .or_else(|| {
                self.structure
                    .as_ref()
                    .and_then(|s| s.colors.as_ref())
                    .map(|c| c.primary.as_str())
            })
    }
}

/// A named snapshot of the structure record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub structure: SiteStructure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("Hello", Vec::new());
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.text, "Hello");
        assert!(msg.agent.is_none());

        let msg = ChatMessage::ai("Hi there!", AgentPersona::Architect);
        assert_eq!(msg.role, MessageRole::Ai);
        assert_eq!(msg.agent, Some(AgentPersona::Architect));

        let msg = ChatMessage::system("Setup required");
        assert_eq!(msg.role, MessageRole::System);
        assert_eq!(msg.agent, Some(AgentPersona::System));
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(TaskCategory::PhpLogic.as_str(), "php_logic");
        let parsed: TaskCategory = serde_json::from_str("\"frontend_css\"").unwrap();
        assert_eq!(parsed, TaskCategory::FrontendCss);
    }

    #[test]
    fn test_page_layout_wire_names() {
        assert_eq!(
            serde_json::to_string(&PageLayout::FullWidth).unwrap(),
            "\"full-width\""
        );
    }

    #[test]
    fn test_partial_structure_payload_parses() {
        let payload = r#"{"pluginName": "realty", "cpts": ["property"]}"#;
        let structure: SiteStructure = serde_json::from_str(payload).unwrap();
        assert_eq!(structure.plugin_name, "realty");
        assert_eq!(structure.cpts, vec!["property"]);
        assert!(structure.layout_settings.is_none());
    }

    #[test]
    fn test_visuals_take_display_precedence() {
        let mut ctx = ProjectContext::default();
        ctx.structure = Some(SiteStructure {
            plugin_name: "realty".to_string(),
            site_name: String::new(),
            tagline: String::new(),
            description: None,
            cpts: Vec::new(),
            taxonomies: Vec::new(),
            features: Vec::new(),
            colors: Some(ColorPair {
                primary: "#111111".to_string(),
                secondary: "#222222".to_string(),
            }),
            layout_settings: Some(LayoutSettings {
                content_width: 1140,
                widgets_space: 20,
                page_layout: PageLayout::Boxed,
            }),
        });

        assert_eq!(ctx.effective_content_width(), Some(1140));
        assert_eq!(ctx.effective_primary_color(), Some("#111111"));

        ctx.visuals.content_width = Some(1320);
        ctx.visuals.primary_color = Some("#ff0000".to_string());
        ctx.visuals.page_layout = Some(PageLayout::FullWidth);

        assert_eq!(ctx.effective_content_width(), Some(1320));
        assert_eq!(ctx.effective_primary_color(), Some("#ff0000"));
        assert_eq!(ctx.effective_page_layout(), Some(PageLayout::FullWidth));
    }
}
