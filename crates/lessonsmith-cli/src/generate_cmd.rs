//! `lessonsmith generate`: run the pipeline and write the lesson as JSON.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio_stream::StreamExt;

use lessonsmith_core::client::{GenerationClient, GenerationSettings, OpenAiClient};
use lessonsmith_core::ingest::{self, ExtractionStatus};
use lessonsmith_core::pipeline::LessonPipeline;
use lessonsmith_core::progress::{ChannelSink, SessionId};
use lessonsmith_core::types::{DEFAULT_DIFFICULTY, DEFAULT_DURATION, GenerationRequest, LessonRecord};

use crate::config::LessonsmithConfig;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Subject, e.g. "Science"
    #[arg(long)]
    pub subject: String,
    /// Grade level, e.g. "10"
    #[arg(long)]
    pub grade: String,
    /// Lesson topic
    #[arg(long)]
    pub topic: String,
    /// Subtopic to cover (repeatable)
    #[arg(long = "subtopic")]
    pub subtopics: Vec<String>,
    /// Difficulty level
    #[arg(long, default_value = DEFAULT_DIFFICULTY)]
    pub difficulty: String,
    /// Target lesson duration
    #[arg(long, default_value = DEFAULT_DURATION)]
    pub duration: String,
    /// Reference document whose text is passed to the curriculum stage (repeatable)
    #[arg(long = "reference")]
    pub references: Vec<PathBuf>,
    /// Identifier of a stored reference document (repeatable)
    #[arg(long = "document-id")]
    pub document_ids: Vec<i64>,
    /// Session id for progress events (random when omitted)
    #[arg(long)]
    pub session_id: Option<SessionId>,
    /// Write the lesson here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Build the generation request from the arguments.
    pub fn to_request(&self, supplementary_context: Option<String>) -> GenerationRequest {
        let mut request = GenerationRequest::new(&self.subject, &self.grade, &self.topic)
            .with_subtopics(self.subtopics.iter().cloned())
            .with_difficulty(&self.difficulty)
            .with_duration(&self.duration)
            .with_reference_documents(self.document_ids.clone());
        if let Some(text) = supplementary_context {
            request = request.with_supplementary_context(text);
        }
        request
    }
}

/// Extract text from every reference document, reporting the ones that
/// could not be read.
async fn load_references(paths: &[PathBuf]) -> Option<String> {
    let mut extractions = Vec::with_capacity(paths.len());
    for path in paths {
        let extraction = ingest::extract_text(path).await;
        if extraction.status != ExtractionStatus::Success {
            eprintln!(
                "warning: skipping reference {} ({}): {}",
                path.display(),
                extraction.status,
                extraction.error.as_deref().unwrap_or("no text")
            );
        }
        extractions.push(extraction);
    }
    ingest::combine_extractions(&extractions)
}

/// Execute the `lessonsmith generate` command.
pub async fn run_generate(args: GenerateArgs, config: LessonsmithConfig) -> Result<()> {
    config.require_api_key()?;

    let client: Arc<dyn GenerationClient> = Arc::new(OpenAiClient::new(&config.generation));
    let settings = GenerationSettings::from(&config.generation);
    let record = generate(&args, client, settings).await?;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_record(&record, file)?;
            eprintln!("Lesson written to {}", path.display());
        }
        None => write_record(&record, std::io::stdout().lock())?,
    }
    Ok(())
}

/// Run the pipeline, printing progress events to stderr as they arrive.
pub async fn generate(
    args: &GenerateArgs,
    client: Arc<dyn GenerationClient>,
    settings: GenerationSettings,
) -> Result<LessonRecord> {
    let supplementary = load_references(&args.references).await;
    let request = args.to_request(supplementary);
    let session_id = args.session_id.unwrap_or_default();

    let (sink, mut events) = ChannelSink::with_stream();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            eprintln!("{event}");
        }
    });

    let pipeline = LessonPipeline::new(client, settings).with_progress_sink(Arc::new(sink));
    let result = pipeline.generate_lesson(&request, session_id).await;
    // Dropping the pipeline closes the channel so the printer drains and exits.
    drop(pipeline);
    printer.await.context("progress printer task panicked")?;

    result.with_context(|| format!("lesson generation failed for session {session_id}"))
}

fn write_record(record: &LessonRecord, mut out: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, record).context("failed to serialize lesson")?;
    writeln!(out).context("failed to write lesson")?;
    Ok(())
}
