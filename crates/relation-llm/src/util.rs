//! Shared helpers for OpenAI-compatible clients.

/// Mask API key for safe display
pub(crate) fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

/// Sanitize API error messages so keys never reach logs or clients
pub(crate) fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your OPENAI_API_KEY.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "OpenAI rate limit exceeded. Please wait.".to_string();
    }

    if error.len() < 200 && !error.contains("sk-") {
        return error.to_string();
    }

    "An API error occurred.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_masking() {
        let masked = mask_api_key("sk-proj-1234567890abcdefghij");
        assert!(masked.starts_with("sk-p"));
        assert!(masked.ends_with("ghij"));
        assert_eq!(mask_api_key("short"), "****");
    }

    #[test]
    fn test_sanitize_api_error() {
        let sanitized = sanitize_api_error("Incorrect API key provided: sk-abc");
        assert!(!sanitized.contains("sk-abc"));
        assert!(sanitized.contains("OPENAI_API_KEY"));

        assert!(sanitize_api_error("You exceeded your current quota").contains("rate limit"));
        assert_eq!(sanitize_api_error("model not found"), "model not found");
    }
}
