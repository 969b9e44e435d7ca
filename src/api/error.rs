use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data.
    /// Error bodies are arbitrary HTML, so the cut must land on a char
    /// boundary, not a raw byte offset.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            404 => FetchError::NotFound(truncated),
            500..=599 => FetchError::ServerError(truncated),
            _ => FetchError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_codes() {
        assert!(matches!(FetchError::from_status(404, "gone"), FetchError::NotFound(_)));
        assert!(matches!(FetchError::from_status(503, "down"), FetchError::ServerError(_)));
        assert!(matches!(
            FetchError::from_status(418, "teapot"),
            FetchError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        // 200 euro signs: 600 bytes, with byte 500 inside a character
        let body = "\u{20AC}".repeat(200);
        let err = FetchError::from_status(404, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated, 600 total bytes"));

        // ASCII body at the limit passes through untouched
        let short = "x".repeat(MAX_ERROR_BODY_LENGTH);
        assert_eq!(FetchError::truncate_body(&short), short);
    }
}
