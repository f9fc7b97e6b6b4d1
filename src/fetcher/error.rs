//! Fetch error taxonomy

use thiserror::Error;

/// Why an exchange with the content service produced no usable data
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No response was obtained (connect, DNS, timeout, body read)
    #[error("failed to reach content service: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status
    #[error("content service returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The response body was not a valid query envelope
    #[error("invalid response from content service: {0}")]
    Decode(String),

    /// The service reported query errors
    #[error("query failed: {}", messages.join("; "))]
    Query { messages: Vec<String> },
}

impl FetchError {
    /// Short machine-friendly name for logs and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Decode(_) => "decode",
            FetchError::Query { .. } => "query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FetchError::Query {
            messages: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "query failed: a; b");
        assert_eq!(err.kind(), "query");

        let err = FetchError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "content service returned HTTP 502");
    }
}
