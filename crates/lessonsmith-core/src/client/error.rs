use thiserror::Error;

/// Failure of a call to the generation backend.
///
/// These are never absorbed by the pipeline: any `ServiceError` aborts the
/// run it occurs in.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no API key configured for the generation backend")]
    MissingApiKey,

    #[error("request to generation backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response from generation backend: {0}")]
    MalformedResponse(String),

    #[error("generation backend returned no choices")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err = ServiceError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "generation backend returned 429: rate limited");
    }

    #[test]
    fn missing_key_display() {
        assert_eq!(
            ServiceError::MissingApiKey.to_string(),
            "no API key configured for the generation backend"
        );
    }
}
