//! services/app/src/adapters/mod.rs
//!
//! Concrete implementations of the ports defined in `coursepilot_core`.

pub mod assessment_llm;
pub mod course_llm;
pub mod explore_llm;
pub mod flashcards_llm;
pub mod store;
pub mod tutor_llm;

/// Trims a model reply down to the JSON payload. Models occasionally wrap
/// JSON in a Markdown code fence despite instructions not to.
pub(crate) fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag ("json") on the opening fence line, if present.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::extract_json;

    #[test]
    fn extract_json_strips_code_fences() {
        assert_eq!(extract_json("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("  {\"a\":1}  "), "{\"a\":1}");
    }
}
