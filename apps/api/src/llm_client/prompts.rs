// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to extraction prompts so missing facts come back as null rather
/// than invented values.
pub const NO_GUESSING_INSTRUCTION: &str = "\
    If a value is not stated in the document and cannot be reasonably inferred, \
    use null. Never invent company facts, dates or contact details.";

/// Builds a system prompt from a role description plus the shared fragments.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM} {NO_GUESSING_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_system_includes_shared_fragments() {
        let system = json_system("You are a resume parser.");
        assert!(system.starts_with("You are a resume parser."));
        assert!(system.contains("valid JSON only"));
        assert!(system.contains("use null"));
    }
}
