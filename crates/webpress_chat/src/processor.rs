//! Response processing.
//!
//! Extracts fenced code regions into scanned artifacts, pulls the
//! delimited knowledge-base payload out of raw model output, and turns
//! it into a context patch according to the active persona's merge
//! strategy. KB parsing is best-effort: not every response carries an
//! update, so parse failures are dropped at one deliberate call site.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use webpress_agents::{scan, AgentPersona, MergeStrategy};

use crate::types::{Artifact, ArtifactKind, PageLayout, SiteStructure};

const ARTIFACT_TITLE: &str = "Generated Snippet";

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```([a-zA-Z]*)\n(.*?)\n```").expect("static fence pattern")
    })
}

fn kb_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)---KB_UPDATE---(.*?)---------------").expect("static KB pattern")
    })
}

/// A structured update to fold into the project context
#[derive(Debug, Clone, PartialEq)]
pub enum ContextPatch {
    /// Replace the whole structure record (Architect)
    ReplaceStructure(SiteStructure),
    /// Patch only the layout-driven visual sub-fields (Visionary)
    PatchLayout {
        content_width: Option<u32>,
        page_layout: Option<PageLayout>,
    },
}

/// Output of processing one raw model response
#[derive(Debug, Clone)]
pub struct ProcessedResponse {
    /// Raw text with the KB delimiter block removed and whitespace trimmed
    pub cleaned_text: String,
    /// Extracted artifacts, in order of appearance
    pub artifacts: Vec<Artifact>,
    /// Context patch, when the persona merges and the payload parsed
    pub patch: Option<ContextPatch>,
}

/// Process raw model output into renderable text, artifacts, and an
/// optional context patch.
pub fn process(raw_text: &str, active_agent: AgentPersona) -> ProcessedResponse {
    let artifacts = extract_artifacts(raw_text);
    let patch = extract_kb_payload(raw_text)
        .and_then(|payload| build_patch(&payload, active_agent));

    let cleaned_text = kb_block_re().replace(raw_text, "").trim().to_string();

    ProcessedResponse {
        cleaned_text,
        artifacts,
        patch,
    }
}

/// Extract fenced code regions as scanned artifacts, order preserved.
/// A fence whose language tag mentions json becomes a data artifact.
fn extract_artifacts(raw_text: &str) -> Vec<Artifact> {
    fence_re()
        .captures_iter(raw_text)
        .map(|caps| {
            let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let content = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
            let kind = if tag.to_ascii_lowercase().contains("json") {
                ArtifactKind::Data
            } else {
                ArtifactKind::Code
            };
            let report = scan(&content);
            Artifact {
                kind,
                title: ARTIFACT_TITLE.to_string(),
                content,
                security_pass: Some(report.pass),
                security_issues: report.issues,
            }
        })
        .collect()
}

/// Find the KB payload: the delimited block first, else the first fenced
/// json block.
fn extract_kb_payload(raw_text: &str) -> Option<String> {
    if let Some(caps) = kb_block_re().captures(raw_text) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }
    fence_re().captures_iter(raw_text).find_map(|caps| {
        let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if tag.to_ascii_lowercase().contains("json") {
            caps.get(2).map(|m| m.as_str().trim().to_string())
        } else {
            None
        }
    })
}

// Wire shape of a Visionary KB payload; only layoutSettings is consumed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionaryPayload {
    layout_settings: Option<LayoutPatchWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutPatchWire {
    content_width: Option<u32>,
    page_layout: Option<PageLayout>,
}

/// Turn a KB payload into a patch per the persona's merge strategy.
/// Parse failures return `None` on purpose: best-effort policy.
fn build_patch(payload: &str, active_agent: AgentPersona) -> Option<ContextPatch> {
    match active_agent.merge_strategy() {
        MergeStrategy::ReplaceStructure => {
            match serde_json::from_str::<SiteStructure>(payload) {
                Ok(structure) => Some(ContextPatch::ReplaceStructure(structure)),
                Err(e) => {
                    debug!(error = %e, "KB payload unparsable as structure, skipping");
                    None
                }
            }
        }
        MergeStrategy::PatchLayoutVisuals => {
            match serde_json::from_str::<VisionaryPayload>(payload) {
                Ok(VisionaryPayload {
                    layout_settings: Some(layout),
                }) => Some(ContextPatch::PatchLayout {
                    content_width: layout.content_width,
                    page_layout: layout.page_layout,
                }),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "KB payload unparsable as layout patch, skipping");
                    None
                }
            }
        }
        MergeStrategy::Ignore => None,
    }
}
