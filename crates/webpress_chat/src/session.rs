//! In-memory session state store.
//!
//! Owns the append-only chat history, the accumulated project context,
//! named structure snapshots, the active persona, and the advisory
//! processing flag. Mutation happens only through the operations below;
//! there is no raw mutable access to history or context.

use chrono::Utc;
use tracing::info;
use webpress_agents::AgentPersona;

use crate::processor::ContextPatch;
use crate::types::{ChatMessage, ProjectContext, ProjectVersion};

/// Scripted welcome message seeded into every new session
const WELCOME_MESSAGE: &str = "Welcome to **WebPress Architect**, your specialized \
**Elementor-Native** AI workspace.\n\nI am your Lead Architect, and I deploy a specialized \
**Mixture of Agents (MoA)** designed to build apps and sites that are 100% compatible with \
Elementor. Every widget, template, and dynamic structure we generate is engineered to be fully \
editable in the Elementor builder—exactly as if you hand-crafted it from scratch.\n\n\
**Ready to build?** Describe the Elementor-powered project or plugin functionality you need today.";

/// Session state store. One per chat session.
pub struct SessionStore {
    history: Vec<ChatMessage>,
    context: ProjectContext,
    versions: Vec<ProjectVersion>,
    active_agent: AgentPersona,
    processing: bool,
}

impl SessionStore {
    /// Create a store seeded with the scripted welcome message
    pub fn new() -> Self {
        Self {
            history: vec![ChatMessage::ai(WELCOME_MESSAGE, AgentPersona::Architect)],
            context: ProjectContext::default(),
            versions: Vec::new(),
            active_agent: AgentPersona::Architect,
            processing: false,
        }
    }

    /// Chat history, in display order
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Accumulated project context
    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// Named structure snapshots
    pub fn versions(&self) -> &[ProjectVersion] {
        &self.versions
    }

    /// Currently active persona
    pub fn active_agent(&self) -> AgentPersona {
        self.active_agent
    }

    /// Advisory in-flight flag; the UI disables its submit affordance
    /// while this is set
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub(crate) fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    /// Append a message. Messages are immutable once appended.
    pub fn append(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    /// Switch the active persona, appending a system note
    pub fn switch_agent(&mut self, agent: AgentPersona) {
        if agent == self.active_agent {
            return;
        }
        self.active_agent = agent;
        self.append(ChatMessage::system(format!(
            "Switched to {} agent. {}",
            agent.display_name(),
            agent.description()
        )));
    }

    /// Fold a context patch into the project context.
    ///
    /// Structure replacement is wholesale and stamps the last-updater
    /// marker; layout patches touch only the two visual sub-fields they
    /// carry (last-writer-wins per sub-field).
    pub fn apply_patch(&mut self, patch: ContextPatch, agent: AgentPersona) {
        match patch {
            ContextPatch::ReplaceStructure(structure) => {
                info!(agent = agent.display_name(), "replacing structure record");
                self.context.structure = Some(structure);
                self.context.last_agent_update = Some(agent);
            }
            ContextPatch::PatchLayout {
                content_width,
                page_layout,
            } => {
                if let Some(width) = content_width {
                    self.context.visuals.content_width = Some(width);
                }
                if let Some(layout) = page_layout {
                    self.context.visuals.page_layout = Some(layout);
                }
            }
        }
    }

    /// Snapshot the current structure record under a name.
    /// No-op when no structure has been generated yet.
    pub fn snapshot_version(&mut self, name: impl Into<String>) -> Option<&ProjectVersion> {
        let structure = self.context.structure.clone()?;
        self.versions.push(ProjectVersion {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            name: name.into(),
            structure,
        });
        self.versions.last()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageRole, PageLayout, SiteStructure};

    fn structure(name: &str) -> SiteStructure {
        SiteStructure {
            plugin_name: name.to_string(),
            site_name: String::new(),
            tagline: String::new(),
            description: None,
            cpts: Vec::new(),
            taxonomies: Vec::new(),
            features: Vec::new(),
            colors: None,
            layout_settings: None,
        }
    }

    #[test]
    fn test_new_store_seeds_welcome() {
        let store = SessionStore::new();
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].role, MessageRole::Ai);
        assert_eq!(store.history()[0].agent, Some(AgentPersona::Architect));
        assert!(store.history()[0].text.contains("WebPress Architect"));
        assert!(!store.is_processing());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = SessionStore::new();
        store.append(ChatMessage::user("first", Vec::new()));
        store.append(ChatMessage::user("second", Vec::new()));
        let texts: Vec<_> = store.history().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts[1..], ["first", "second"]);
    }

    #[test]
    fn test_switch_agent_appends_note() {
        let mut store = SessionStore::new();
        store.switch_agent(AgentPersona::Visionary);
        assert_eq!(store.active_agent(), AgentPersona::Visionary);
        let last = store.history().last().unwrap();
        assert_eq!(last.role, MessageRole::System);
        assert!(last.text.contains("Visionary"));

        // Switching to the current persona is a no-op
        let len = store.history().len();
        store.switch_agent(AgentPersona::Visionary);
        assert_eq!(store.history().len(), len);
    }

    #[test]
    fn test_structure_replace_is_idempotent() {
        let mut store = SessionStore::new();
        let patch = ContextPatch::ReplaceStructure(structure("realty"));

        store.apply_patch(patch.clone(), AgentPersona::Architect);
        let once = store.context().structure.clone();

        store.apply_patch(patch, AgentPersona::Architect);
        let twice = store.context().structure.clone();

        assert_eq!(once, twice);
        assert_eq!(store.context().last_agent_update, Some(AgentPersona::Architect));
    }

    #[test]
    fn test_layout_patch_leaves_other_fields_untouched() {
        let mut store = SessionStore::new();
        store.apply_patch(
            ContextPatch::ReplaceStructure(structure("realty")),
            AgentPersona::Architect,
        );

        store.apply_patch(
            ContextPatch::PatchLayout {
                content_width: Some(1320),
                page_layout: Some(PageLayout::FullWidth),
            },
            AgentPersona::Visionary,
        );

        let ctx = store.context();
        assert_eq!(ctx.visuals.content_width, Some(1320));
        assert_eq!(ctx.visuals.page_layout, Some(PageLayout::FullWidth));
        // Copy deck and remaining visuals stay empty
        assert_eq!(ctx.copy_deck, Default::default());
        assert!(ctx.visuals.primary_color.is_none());
        assert!(ctx.visuals.font_pairing.is_none());
        // Structure record untouched, updater marker still the architect
        assert_eq!(ctx.structure.as_ref().unwrap().plugin_name, "realty");
        assert_eq!(ctx.last_agent_update, Some(AgentPersona::Architect));
    }

    #[test]
    fn test_partial_layout_patch_is_per_subfield() {
        let mut store = SessionStore::new();
        store.apply_patch(
            ContextPatch::PatchLayout {
                content_width: Some(960),
                page_layout: Some(PageLayout::Boxed),
            },
            AgentPersona::Visionary,
        );
        store.apply_patch(
            ContextPatch::PatchLayout {
                content_width: Some(1140),
                page_layout: None,
            },
            AgentPersona::Visionary,
        );

        assert_eq!(store.context().visuals.content_width, Some(1140));
        assert_eq!(store.context().visuals.page_layout, Some(PageLayout::Boxed));
    }

    #[test]
    fn test_snapshot_requires_structure() {
        let mut store = SessionStore::new();
        assert!(store.snapshot_version("v1").is_none());

        store.apply_patch(
            ContextPatch::ReplaceStructure(structure("realty")),
            AgentPersona::Architect,
        );
        let version = store.snapshot_version("v1").unwrap();
        assert_eq!(version.name, "v1");
        assert_eq!(version.structure.plugin_name, "realty");
        assert_eq!(store.versions().len(), 1);
    }
}
