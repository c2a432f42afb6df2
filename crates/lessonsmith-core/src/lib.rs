//! Lesson plan generation through a staged pipeline of LLM agents.
//!
//! A [`GenerationRequest`] flows through curriculum analysis, content
//! generation, assessment design, compilation, quality review and assembly,
//! producing a [`LessonRecord`]. Progress is reported to an injected
//! [`ProgressSink`].

pub mod agent;
pub mod assemble;
pub mod client;
pub mod compile;
pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod types;

pub use client::{GenerationClient, GenerationSettings, OpenAiClient, ServiceError};
pub use config::GenerationConfig;
pub use pipeline::{LessonPipeline, PipelineError, Stage};
pub use progress::{ChannelSink, ProgressEvent, ProgressSink, SessionId};
pub use types::{GenerationRequest, LessonRecord};
