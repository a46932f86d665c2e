//! Agent personas and their merge behavior.
//!
//! Each persona selects a prompt framing in the chat core and a single,
//! explicit strategy for folding knowledge-base payloads into the project
//! context. Keeping the strategy on the enum avoids persona conditionals
//! scattered across call sites.

use serde::{Deserialize, Serialize};

/// Agent personas available in the workspace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentPersona {
    /// Plans site/plugin structure and owns the structure record
    Architect,
    /// Writes headlines and sales copy
    Copywriter,
    /// Designer persona, handles visual and layout direction
    Visionary,
    /// Scripted/system messages (setup guidance, errors)
    System,
}

/// How a parsed knowledge-base payload is folded into the project context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Replace the whole structure record and stamp the last-updater marker
    ReplaceStructure,
    /// Patch only the layout-driven visual sub-fields (content width,
    /// page layout), leaving everything else untouched
    PatchLayoutVisuals,
    /// Persona does not patch project context
    Ignore,
}

impl AgentPersona {
    /// Get the display name for this persona
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Architect => "Architect",
            Self::Copywriter => "Copywriter",
            Self::Visionary => "Visionary",
            Self::System => "System",
        }
    }

    /// Get a brief description of this persona's role
    pub fn description(&self) -> &'static str {
        match self {
            Self::Architect => "Plans plugin and site structure, CPTs, and taxonomies",
            Self::Copywriter => "Writes headlines, body copy, and calls to action",
            Self::Visionary => "Directs visual design, layout, and imagery",
            Self::System => "Delivers setup guidance and system notices",
        }
    }

    /// Merge strategy applied to knowledge-base payloads produced while
    /// this persona is active.
    ///
    /// Copywriter deliberately maps to [`MergeStrategy::Ignore`] for now;
    /// the copy deck lives in the data model but no merge is wired up yet.
    pub fn merge_strategy(&self) -> MergeStrategy {
        match self {
            Self::Architect => MergeStrategy::ReplaceStructure,
            Self::Visionary => MergeStrategy::PatchLayoutVisuals,
            Self::Copywriter | Self::System => MergeStrategy::Ignore,
        }
    }
}
