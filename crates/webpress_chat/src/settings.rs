//! Application settings and the local settings blob.
//!
//! Settings are stored as a single JSON blob under
//! `<root>/.webpress/settings.json`. Loading merges the blob over
//! defaults (missing fields fall back per-field); unparsable data
//! silently resets to defaults. Saving replaces the blob wholesale.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ChatResult;
use crate::router::ORCHESTRATOR_FLASH;

/// User-facing application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// OpenRouter credential (BYOK); empty means not configured
    pub open_router_key: String,
    /// Selected base model identifier. Routing derives tiers from the
    /// toggles below, not from this field.
    pub model: String,
    /// Use the higher-reasoning orchestrator tier for classification
    /// and fallback completion
    pub use_pro_orchestrator: bool,
    /// Use the higher-tier designer image model
    pub use_pro_designer: bool,
    /// Enable the image-generation designer agent
    pub use_image_agent: bool,
    /// Named integration flags, each independently boolean
    pub integrations: BTreeMap<String, bool>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            open_router_key: String::new(),
            model: ORCHESTRATOR_FLASH.to_string(),
            use_pro_orchestrator: false,
            use_pro_designer: false,
            use_image_agent: true,
            integrations: default_integrations(),
        }
    }
}

impl AppSettings {
    /// Whether a provider credential is configured
    pub fn is_configured(&self) -> bool {
        !self.open_router_key.is_empty()
    }
}

fn default_integrations() -> BTreeMap<String, bool> {
    let mut map = BTreeMap::new();
    map.insert("elementor".to_string(), true);
    map.insert("woocommerce".to_string(), false);
    map.insert("acf".to_string(), true);
    map.insert("gutenberg".to_string(), true);
    map.insert("divi".to_string(), false);
    map.insert("fluent_crm".to_string(), false);
    map.insert("fluent_forms".to_string(), false);
    map.insert("fluent_smtp".to_string(), false);
    map
}

/// File-backed store for the settings blob
#[derive(Clone)]
pub struct SettingsStore {
    root: PathBuf,
}

impl SettingsStore {
    /// Create a store rooted at a workspace directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(".webpress").join("settings.json")
    }

    /// Load settings, merging the stored blob over defaults.
    /// Missing or corrupt data resets to defaults without error.
    pub fn load(&self) -> AppSettings {
        let path = self.settings_path();
        if !path.exists() {
            return AppSettings::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<AppSettings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(error = %e, "corrupt settings blob, resetting to defaults");
                    AppSettings::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to read settings blob, using defaults");
                AppSettings::default()
            }
        }
    }

    /// Replace the stored blob wholesale
    pub fn save(&self, settings: &AppSettings) -> ChatResult<()> {
        let path = self.settings_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
