//! The `GenerationClient` trait -- the adapter interface for text-generation
//! backends.
//!
//! The trait is object-safe so the pipeline can hold an
//! `Arc<dyn GenerationClient>` and tests can substitute scripted backends.

use async_trait::async_trait;

use super::error::ServiceError;
use super::types::CompletionRequest;

/// Adapter interface for a chat-completion backend.
///
/// Implementors issue exactly one backend call per [`complete`] and return
/// the assistant's text verbatim. They must not retry: retry policy belongs
/// to the caller.
///
/// [`complete`]: GenerationClient::complete
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Human-readable backend name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send the two-message exchange and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

// Compile-time assertion: GenerationClient must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn GenerationClient) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the user message back, used only to prove the trait can be
    /// implemented and used as `dyn GenerationClient`.
    struct EchoClient;

    #[async_trait]
    impl GenerationClient for EchoClient {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
            Ok(request.user.clone())
        }
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn GenerationClient> = Box::new(EchoClient);
        assert_eq!(client.name(), "echo");
    }

    #[tokio::test]
    async fn echo_client_returns_user_message() {
        let client: Box<dyn GenerationClient> = Box::new(EchoClient);
        let request = CompletionRequest {
            model: "m".to_string(),
            temperature: 0.2,
            max_tokens: 10,
            system: "sys".to_string(),
            user: "hello".to_string(),
        };
        assert_eq!(client.complete(&request).await.unwrap(), "hello");
    }
}
