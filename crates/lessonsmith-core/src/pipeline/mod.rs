//! Lesson pipeline: runs the stage agents in order and assembles the result.
//!
//! ```text
//! request
//!   -> CurriculumExpert     (5 .. 25)
//!   -> ContentCreator       (30 .. 60)
//!   -> AssessmentAgent      (65 .. 80)
//!   -> LessonCompiler       (85)
//!   -> QualityReviewAgent   (90 .. 95)
//!   -> LessonAssembler      (98)
//!   -> Complete             (100)
//! ```
//!
//! A backend failure at any agent stage aborts the run: one `failed` event
//! is emitted and the error is returned. Unparseable responses never abort;
//! the stage continues with its fallback value.

pub mod state;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::agent::{
    Agent, LessonBrief, ReviewDraft, assessment_generator, content_generator,
    curriculum_analyzer, quality_reviewer,
};
use crate::assemble::assemble;
use crate::client::{GenerationClient, GenerationSettings, ServiceError};
use crate::compile::compile;
use crate::progress::{NoopSink, ProgressEvent, ProgressSink, SessionId};
use crate::types::{GenerationRequest, LessonRecord, ProgressStatus};

pub use state::{RunState, Stage};

/// Stage label of the final success event.
pub const COMPLETE_LABEL: &str = "Complete";

/// Stage label of the failure event.
pub const ERROR_LABEL: &str = "Error";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ServiceError,
    },
}

impl PipelineError {
    /// The stage that was executing when the run failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Stage { stage, .. } => *stage,
        }
    }

    /// Text reported as the failure cause in progress events.
    pub fn cause(&self) -> String {
        match self {
            Self::Stage { source, .. } => source.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run tracker
// ---------------------------------------------------------------------------

/// Per-run progress bookkeeping.
///
/// Owned by a single run. Keeps in-progress events non-decreasing and
/// checks every state change against [`RunState::is_valid_transition`].
struct RunTracker<'a> {
    session_id: SessionId,
    sink: &'a dyn ProgressSink,
    state: RunState,
    last_progress: u8,
}

impl<'a> RunTracker<'a> {
    fn new(session_id: SessionId, sink: &'a dyn ProgressSink) -> Self {
        Self {
            session_id,
            sink,
            state: RunState::Pending,
            last_progress: 0,
        }
    }

    fn transition(&mut self, to: RunState) {
        let valid = RunState::is_valid_transition(self.state, to);
        if !valid {
            warn!(
                session_id = %self.session_id,
                from = %self.state,
                to = %to,
                "unexpected run state transition"
            );
        }
        debug_assert!(valid, "invalid run state transition {} -> {}", self.state, to);
        self.state = to;
    }

    fn emit(&self, progress: u8, stage: &str, status: ProgressStatus, message: String, error: Option<String>) {
        self.sink.on_progress(&ProgressEvent {
            session_id: self.session_id,
            progress,
            current_stage: stage.to_string(),
            status,
            message: Some(message),
            error,
        });
    }

    fn in_progress(&mut self, progress: u8, message: &str) {
        let RunState::Running(stage) = self.state else {
            return;
        };
        let progress = progress.max(self.last_progress);
        self.last_progress = progress;
        self.emit(progress, stage.label(), ProgressStatus::InProgress, message.to_string(), None);
    }

    /// Enter `stage` and report its start.
    fn begin(&mut self, stage: Stage, progress: u8, message: &str) {
        self.transition(RunState::Running(stage));
        self.in_progress(progress, message);
    }

    fn complete(&mut self) {
        self.transition(RunState::Completed);
        self.last_progress = 100;
        self.emit(
            100,
            COMPLETE_LABEL,
            ProgressStatus::Completed,
            "Lesson generation completed successfully".to_string(),
            None,
        );
    }

    fn fail(&mut self, cause: &str) {
        self.transition(RunState::Failed);
        self.emit(
            0,
            ERROR_LABEL,
            ProgressStatus::Failed,
            format!("Generation failed: {cause}"),
            Some(cause.to_string()),
        );
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Orchestrates one lesson generation per call.
///
/// Holds no per-run state; a single instance may serve concurrent runs.
pub struct LessonPipeline {
    client: Arc<dyn GenerationClient>,
    settings: GenerationSettings,
    sink: Arc<dyn ProgressSink>,
}

impl LessonPipeline {
    /// Create a pipeline that discards progress events.
    pub fn new(client: Arc<dyn GenerationClient>, settings: GenerationSettings) -> Self {
        Self {
            client,
            settings,
            sink: Arc::new(NoopSink),
        }
    }

    /// Report progress to `sink`.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run every stage for `request` and return the assembled lesson.
    pub async fn generate_lesson(
        &self,
        request: &GenerationRequest,
        session_id: SessionId,
    ) -> Result<LessonRecord, PipelineError> {
        info!(
            session_id = %session_id,
            subject = %request.subject,
            topic = %request.topic,
            backend = self.client.name(),
            "starting lesson generation"
        );

        let mut tracker = RunTracker::new(session_id, self.sink.as_ref());
        match self.run_stages(request, &mut tracker).await {
            Ok(record) => {
                tracker.complete();
                info!(
                    session_id = %session_id,
                    components = record.components.len(),
                    quality_score = ?record.quality_score,
                    "lesson generation completed"
                );
                Ok(record)
            }
            Err(err) => {
                let cause = err.cause();
                error!(
                    session_id = %session_id,
                    stage = %err.stage(),
                    error = %cause,
                    "lesson generation failed"
                );
                tracker.fail(&cause);
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &GenerationRequest,
        tracker: &mut RunTracker<'_>,
    ) -> Result<LessonRecord, PipelineError> {
        tracker.begin(Stage::Curriculum, 5, "Starting curriculum analysis...");
        let analysis = self
            .run_agent(&curriculum_analyzer(), Stage::Curriculum, request, tracker.session_id)
            .await?;
        tracker.in_progress(25, "Curriculum analysis completed");

        let brief = LessonBrief {
            request,
            learning_objectives: &analysis.learning_objectives,
        };

        tracker.begin(Stage::Content, 30, "Generating lesson content...");
        let content = self
            .run_agent(&content_generator(), Stage::Content, &brief, tracker.session_id)
            .await?;
        tracker.in_progress(60, "Lesson content generated");

        tracker.begin(Stage::Assessment, 65, "Creating assessments...");
        let assessments = self
            .run_agent(&assessment_generator(), Stage::Assessment, &brief, tracker.session_id)
            .await?;
        tracker.in_progress(80, "Assessments created");

        tracker.begin(Stage::Compile, 85, "Compiling lesson components...");
        let components = compile(&content, &assessments);

        tracker.begin(Stage::Review, 90, "Reviewing lesson quality...");
        let draft = ReviewDraft::new(request, &analysis, &content, &assessments, &components);
        let review = self
            .run_agent(&quality_reviewer(), Stage::Review, &draft, tracker.session_id)
            .await?;
        tracker.in_progress(95, "Quality review completed");

        tracker.begin(Stage::Assemble, 98, "Finalizing lesson...");
        Ok(assemble(request, &analysis, components, &review))
    }

    async fn run_agent<I, O>(
        &self,
        agent: &Agent<I, O>,
        stage: Stage,
        input: &I,
        session_id: SessionId,
    ) -> Result<O, PipelineError>
    where
        I: Sync,
        O: serde::de::DeserializeOwned,
    {
        debug_assert!(stage.calls_backend(), "{stage} does not call the backend");
        let decoded = agent
            .run(self.client.as_ref(), &self.settings, input)
            .await
            .map_err(|source| PipelineError::Stage { stage, source })?;

        if decoded.is_fallback() {
            warn!(
                session_id = %session_id,
                stage = %stage,
                "continuing with fallback output"
            );
        }
        Ok(decoded.into_inner())
    }
}
