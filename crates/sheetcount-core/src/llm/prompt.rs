//! Prompts sent with every counting request.

use std::path::Path;

use crate::error::ConfigError;

/// Built-in system prompt describing the counting rules and answer schema.
pub const SYSTEM_PROMPT: &str = include_str!("../../prompts/system.txt");

/// User turn that accompanies the image.
pub const USER_PROMPT: &str =
    "Count the colored sheets in this image and provide the results in the specified JSON format.";

/// Load the system prompt, preferring an override file when one is configured.
pub fn load_system_prompt(override_path: Option<&Path>) -> Result<String, ConfigError> {
    match override_path {
        Some(path) => {
            let prompt = std::fs::read_to_string(path)?;
            if prompt.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "system prompt file {} is empty",
                    path.display()
                )));
            }
            tracing::info!("Using system prompt from {}", path.display());
            Ok(prompt)
        }
        None => Ok(SYSTEM_PROMPT.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prompt_names_required_keys() {
        for key in ["sheets_present", "colours", "total", "accuracy"] {
            assert!(SYSTEM_PROMPT.contains(key), "prompt is missing {key}");
        }
    }

    #[test]
    fn test_builtin_prompt_keeps_counting_rules() {
        for rule in [
            "KEY EMPHASIS (do not violate):",
            "- Use EDGE DETECTION ONLY.",
            "- Always prefer lower/conservative integer when in doubt.",
            "- Never output rounded tens for visible small counts.",
            "lower confidence and, if >50% of edges look noisy, set count conservative (e.g., reduce by 10–20%).",
            "\"color_name\": integer_count,",
            "round down** to the nearest integer (never round up)",
        ] {
            assert!(SYSTEM_PROMPT.contains(rule), "prompt is missing rule: {rule}");
        }
    }

    #[test]
    fn test_load_without_override_uses_builtin() {
        assert_eq!(load_system_prompt(None).unwrap(), SYSTEM_PROMPT);
    }

    #[test]
    fn test_load_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Count only red sheets.").unwrap();

        assert_eq!(
            load_system_prompt(Some(&path)).unwrap(),
            "Count only red sheets."
        );
    }

    #[test]
    fn test_load_rejects_blank_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "  \n").unwrap();

        assert!(load_system_prompt(Some(&path)).is_err());
    }

    #[test]
    fn test_load_missing_override_is_read_error() {
        let err = load_system_prompt(Some(Path::new("/nonexistent/prompt.txt"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}
