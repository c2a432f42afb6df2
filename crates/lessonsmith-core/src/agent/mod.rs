//! Stage agents: a fixed role instruction plus a prompt builder and a
//! fallback decoder, wrapped around one generation call.
//!
//! There is a single [`Agent`] type; the four pipeline agents are values of
//! it built by [`curriculum_analyzer`], [`content_generator`],
//! [`assessment_generator`] and [`quality_reviewer`].
//!
//! Decoding never fails. Text that does not parse into the agent's output
//! type is replaced by the agent's fallback value and reported as
//! [`Decoded::Fallback`].

pub mod assessment;
pub mod content;
pub mod curriculum;
pub mod review;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::{CompletionRequest, GenerationClient, GenerationSettings, ServiceError};
use crate::types::GenerationRequest;

pub use assessment::generator as assessment_generator;
pub use content::generator as content_generator;
pub use curriculum::analyzer as curriculum_analyzer;
pub use review::{ReviewDraft, reviewer as quality_reviewer};

// ---------------------------------------------------------------------------
// Decode outcome
// ---------------------------------------------------------------------------

/// Result of decoding a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The response parsed into the expected shape.
    Parsed(T),
    /// The response did not parse; `value` is the agent's fallback and `raw`
    /// the text that was received.
    Fallback { value: T, raw: String },
}

impl<T> Decoded<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }
}

/// Return the body of the first Markdown code fence in `text`, or the
/// trimmed text when there is no fence.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(start) = text.find("```") else {
        return text;
    };
    let after_open = &text[start + 3..];
    // Skip the info string (e.g. `json`) on the opening line.
    let body = match after_open.find('\n') {
        Some(nl) => &after_open[nl + 1..],
        None => after_open,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse `raw` as JSON, retrying on the fenced body if the whole text does
/// not parse.
fn parse_json<O: DeserializeOwned>(raw: &str) -> Result<O, serde_json::Error> {
    serde_json::from_str(raw.trim()).or_else(|err| {
        let inner = strip_code_fence(raw);
        if inner.len() == raw.trim().len() {
            Err(err)
        } else {
            serde_json::from_str(inner)
        }
    })
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Input shared by the content and assessment agents.
#[derive(Debug, Clone, Copy)]
pub struct LessonBrief<'a> {
    pub request: &'a GenerationRequest,
    pub learning_objectives: &'a [String],
}

/// A generation stage: role instruction, sampling temperature, prompt
/// builder and fallback.
pub struct Agent<I, O> {
    name: &'static str,
    role_instruction: &'static str,
    temperature: f32,
    build_prompt: fn(&I) -> String,
    fallback: fn(&I, &str) -> O,
}

impl<I, O> std::fmt::Debug for Agent<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl<I, O: DeserializeOwned> Agent<I, O> {
    pub fn new(
        name: &'static str,
        role_instruction: &'static str,
        temperature: f32,
        build_prompt: fn(&I) -> String,
        fallback: fn(&I, &str) -> O,
    ) -> Self {
        Self {
            name,
            role_instruction,
            temperature,
            build_prompt,
            fallback,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn role_instruction(&self) -> &'static str {
        self.role_instruction
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Build the task prompt for `input`.
    pub fn build_prompt(&self, input: &I) -> String {
        (self.build_prompt)(input)
    }

    /// The completion request this agent sends for `input`.
    pub fn completion_request(&self, settings: &GenerationSettings, input: &I) -> CompletionRequest {
        CompletionRequest {
            model: settings.model.clone(),
            temperature: self.temperature,
            max_tokens: settings.max_tokens,
            system: self.role_instruction.to_string(),
            user: self.build_prompt(input),
        }
    }

    /// Decode a raw response, substituting the fallback when it does not
    /// parse.
    pub fn decode(&self, input: &I, raw: &str) -> Decoded<O> {
        match parse_json::<O>(raw) {
            Ok(value) => Decoded::Parsed(value),
            Err(e) => {
                warn!(
                    agent = self.name,
                    error = %e,
                    response_len = raw.len(),
                    "response is not valid JSON for this stage, using fallback"
                );
                Decoded::Fallback {
                    value: (self.fallback)(input, raw),
                    raw: raw.to_string(),
                }
            }
        }
    }

    /// Issue one generation call and decode the result.
    ///
    /// Backend failures propagate; malformed responses do not.
    pub async fn run(
        &self,
        client: &dyn GenerationClient,
        settings: &GenerationSettings,
        input: &I,
    ) -> Result<Decoded<O>, ServiceError> {
        let request = self.completion_request(settings, input);
        debug!(agent = self.name, backend = client.name(), "calling generation backend");
        let raw = client.complete(&request).await?;
        Ok(self.decode(input, &raw))
    }
}

/// Join list items for inclusion in a prompt line.
pub(crate) fn join_list(items: &[String]) -> String {
    items.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Shape {
        answer: u32,
    }

    fn echo_prompt(input: &String) -> String {
        format!("question: {input}")
    }

    fn zero(_: &String, _: &str) -> Shape {
        Shape { answer: 0 }
    }

    fn test_agent() -> Agent<String, Shape> {
        Agent::new("Tester", "You answer questions.", 0.2, echo_prompt, zero)
    }

    #[test]
    fn decode_valid_json_is_parsed() {
        let decoded = test_agent().decode(&"q".to_string(), r#"{"answer": 42}"#);
        assert_eq!(decoded, Decoded::Parsed(Shape { answer: 42 }));
        assert!(!decoded.is_fallback());
    }

    #[test]
    fn decode_invalid_json_uses_fallback_and_keeps_raw() {
        let decoded = test_agent().decode(&"q".to_string(), "forty-two");
        assert!(decoded.is_fallback());
        match decoded {
            Decoded::Fallback { value, raw } => {
                assert_eq!(value, Shape { answer: 0 });
                assert_eq!(raw, "forty-two");
            }
            Decoded::Parsed(_) => unreachable!(),
        }
    }

    #[test]
    fn decode_wrong_shape_uses_fallback() {
        let decoded = test_agent().decode(&"q".to_string(), r#"{"answer": "many"}"#);
        assert_eq!(decoded.into_inner(), Shape { answer: 0 });
    }

    #[test]
    fn decode_fenced_json_is_parsed() {
        let raw = "Here you go:\n```json\n{\"answer\": 7}\n```\nHope that helps.";
        let decoded = test_agent().decode(&"q".to_string(), raw);
        assert_eq!(decoded, Decoded::Parsed(Shape { answer: 7 }));
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn json_containing_backticks_parses_directly() {
        #[derive(Debug, Deserialize)]
        struct Text {
            body: String,
        }
        let raw = r#"{"body": "use ```rust blocks``` for code"}"#;
        let parsed: Text = parse_json(raw).unwrap();
        assert!(parsed.body.contains("```rust"));
    }

    #[test]
    fn completion_request_uses_agent_temperature_and_settings() {
        let settings = GenerationSettings {
            model: "gpt-4o".to_string(),
            max_tokens: 123,
        };
        let request = test_agent().completion_request(&settings, &"why".to_string());
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, 123);
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.system, "You answer questions.");
        assert_eq!(request.user, "question: why");
    }
}
