// Shared prompt constants and prompt-building utilities.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appends the JSON-only rules to a role-specific system prompt.
pub fn json_system(role: &str) -> String {
    format!("{} {JSON_ONLY_SYSTEM}", role.trim_end())
}

/// Renders a list as `- item` lines, or `(none)` when empty.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
