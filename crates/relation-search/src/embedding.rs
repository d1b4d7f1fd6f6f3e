//! Stored embedding text <-> vectors.
//!
//! Embeddings are persisted as JSON arrays. Anything that does not parse as
//! a non-empty array of finite numbers is treated as absent.

use tracing::debug;

/// Parse a stored embedding, returning `None` for missing or malformed text.
pub fn parse_embedding(raw: Option<&str>) -> Option<Vec<f32>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let values: Vec<f64> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Ignoring malformed embedding");
            return None;
        }
    };
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(values.into_iter().map(|v| v as f32).collect())
}

/// Serialize an embedding for storage.
pub fn encode_embedding(vector: &[f32]) -> String {
    serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            parse_embedding(Some(" [0.5, -1, 2e-1] ")),
            Some(vec![0.5, -1.0, 0.2])
        );
    }

    #[test]
    fn test_malformed_is_absent() {
        assert_eq!(parse_embedding(None), None);
        assert_eq!(parse_embedding(Some("")), None);
        assert_eq!(parse_embedding(Some("not json")), None);
        assert_eq!(parse_embedding(Some("[]")), None);
        assert_eq!(parse_embedding(Some("{\"a\":1}")), None);
        assert_eq!(parse_embedding(Some("[1, \"x\"]")), None);
    }

    #[test]
    fn test_encode_parses_back() {
        let v = vec![0.25f32, -0.5, 1.0];
        assert_eq!(parse_embedding(Some(&encode_embedding(&v))), Some(v));
    }
}
