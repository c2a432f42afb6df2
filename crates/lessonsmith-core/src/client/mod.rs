//! Generation client interface for chat-completion backends.
//!
//! This module defines the [`GenerationClient`] trait every backend
//! implements, the [`CompletionRequest`] it receives, the [`ServiceError`]
//! it fails with, and the production [`OpenAiClient`].
//!
//! # Architecture
//!
//! ```text
//! Agent::run
//!     |
//!     |  CompletionRequest { model, temperature, max_tokens, system, user }
//!     v
//! &dyn GenerationClient --complete()--> raw text | ServiceError
//! ```

pub mod error;
pub mod openai;
pub mod trait_def;
pub mod types;

pub use error::ServiceError;
pub use openai::OpenAiClient;
pub use trait_def::GenerationClient;
pub use types::{CompletionRequest, GenerationSettings};
