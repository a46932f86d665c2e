//! System instruction construction.
//!
//! Every completion carries the same framing: category focus, Elementor
//! layout standards, the serialized structure record (when one exists),
//! and the WordPress coding-standard reminders that feed the security
//! heuristics downstream.

use crate::types::{ProjectContext, TaskCategory};

/// Build the system instruction for one routed completion
pub fn build_system_instruction(category: TaskCategory, context: &ProjectContext) -> String {
    let context_json = context
        .structure
        .as_ref()
        .and_then(|s| serde_json::to_string(s).ok())
        .unwrap_or_else(|| "New Project".to_string());

    format!(
        "You are a world-class WordPress and Elementor developer.\n\
         Focus: {}.\n\
         Goal: Generate code and layout definitions that are 100% compatible with Elementor standards.\n\
         \n\
         ELEMENTOR STANDARDS FOR LAYOUT:\n\
         - Default Content Width: 1140px (Boxed).\n\
         - Page Layouts: 'Elementor Full Width' (Header/Footer included) or 'Elementor Canvas' (Blank).\n\
         - When updating KB for structure, include:\n\
           \"layoutSettings\": {{ \"contentWidth\": 1140, \"widgetsSpace\": 20, \"pageLayout\": \"boxed\" | \"full-width\" }}\n\
         \n\
         When generating PHP, output custom Elementor widgets or template data.\n\
         When generating styles, ensure they follow Elementor's theme style guidelines.\n\
         Code must allow the user to edit the result within the Elementor Editor as if it was created there from scratch.\n\
         Context: {}.\n\
         Ensure all code follows WP Coding Standards (Nonces, Sanitization, Escaping).",
        category.as_str().to_uppercase(),
        context_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SiteStructure;

    #[test]
    fn test_new_project_context() {
        let instruction =
            build_system_instruction(TaskCategory::PhpLogic, &ProjectContext::default());
        assert!(instruction.contains("Focus: PHP_LOGIC."));
        assert!(instruction.contains("Context: New Project."));
        assert!(instruction.contains("WP Coding Standards"));
    }

    #[test]
    fn test_structure_is_serialized_into_context() {
        let mut ctx = ProjectContext::default();
        ctx.structure = Some(SiteStructure {
            plugin_name: "realty-manager".to_string(),
            site_name: "Realty".to_string(),
            tagline: String::new(),
            description: None,
            cpts: vec!["property".to_string()],
            taxonomies: Vec::new(),
            features: Vec::new(),
            colors: None,
            layout_settings: None,
        });

        let instruction = build_system_instruction(TaskCategory::Architecture, &ctx);
        assert!(instruction.contains("realty-manager"));
        assert!(instruction.contains("Focus: ARCHITECTURE."));
    }
}
