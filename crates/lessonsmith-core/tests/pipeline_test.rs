//! End-to-end pipeline runs against scripted generation backends.

use std::sync::Arc;

use lessonsmith_core::client::{GenerationClient, GenerationSettings};
use lessonsmith_core::pipeline::{LessonPipeline, PipelineError, Stage};
use lessonsmith_core::progress::SessionId;
use lessonsmith_core::types::{ComponentType, GenerationRequest, ProgressStatus};

use lessonsmith_test_utils::{
    FailingClient, RecordingSink, ScriptedClient, StageClient, assessment_json_with_formative,
    content_json, curriculum_json, photosynthesis_request, review_json,
};

fn pipeline(client: Arc<dyn GenerationClient>, sink: Arc<RecordingSink>) -> LessonPipeline {
    LessonPipeline::new(client, GenerationSettings::default()).with_progress_sink(sink)
}

fn component_types(record: &lessonsmith_core::LessonRecord) -> Vec<ComponentType> {
    record.components.iter().map(|c| c.component_type).collect()
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn well_formed_responses_produce_full_lesson() {
    let client = Arc::new(ScriptedClient::canned());
    let sink = Arc::new(RecordingSink::new());
    let record = pipeline(client.clone(), sink.clone())
        .generate_lesson(&photosynthesis_request(), SessionId::new())
        .await
        .unwrap();

    assert_eq!(record.title, "Photosynthesis - Science Lesson");
    assert_eq!(record.id, 0);
    assert_eq!(record.version, "1.0");
    assert_eq!(record.quality_score, Some(8.0));
    assert_eq!(record.feedback, vec!["Add a labelled diagram of the chloroplast"]);
    assert_eq!(record.metadata.learning_objectives.len(), 2);
    assert_eq!(record.metadata.subtopics, vec!["light reaction", "dark reaction"]);
    assert_eq!(
        component_types(&record),
        vec![
            ComponentType::Introduction,
            ComponentType::MainContent,
            ComponentType::InteractiveActivities,
            ComponentType::FormativeAssessment,
            ComponentType::Conclusion,
        ]
    );
    let orders: Vec<u32> = record.components.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);

    // Exactly four backend calls, one per agent stage.
    let requests = client.requests();
    assert_eq!(requests.len(), 4);
    let temperatures: Vec<f32> = requests.iter().map(|r| r.temperature).collect();
    assert_eq!(temperatures, vec![0.1, 0.3, 0.2, 0.1]);
    assert!(requests.iter().all(|r| r.model == "gpt-4" && r.max_tokens == 4000));
}

#[tokio::test]
async fn later_prompts_carry_learning_objectives() {
    let client = Arc::new(ScriptedClient::canned());
    let sink = Arc::new(RecordingSink::new());
    pipeline(client.clone(), sink)
        .generate_lesson(&photosynthesis_request(), SessionId::new())
        .await
        .unwrap();

    let requests = client.requests();
    let objective = "Explain how plants convert light energy into chemical energy";
    assert!(requests[1].user.contains(objective));
    assert!(requests[2].user.contains(objective));
    // The review sees the compiled components.
    assert!(requests[3].user.contains("Starch test on a destarched plant."));
}

#[tokio::test]
async fn mathematics_request_title() {
    let client = Arc::new(ScriptedClient::canned());
    let request = GenerationRequest::new("Mathematics", "10", "Quadratic Equations");
    let record = pipeline(client, Arc::new(RecordingSink::new()))
        .generate_lesson(&request, SessionId::new())
        .await
        .unwrap();
    assert_eq!(record.title, "Quadratic Equations - Mathematics Lesson");
    assert_eq!(record.metadata.difficulty_level, "intermediate");
    assert_eq!(record.metadata.estimated_duration, "45 minutes");
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unparseable_responses_fall_back_at_every_stage() {
    let client = Arc::new(ScriptedClient::always("Sorry, I can only answer in prose."));
    let sink = Arc::new(RecordingSink::new());
    let record = pipeline(client, sink.clone())
        .generate_lesson(&photosynthesis_request(), SessionId::new())
        .await
        .unwrap();

    // Four content components; no formative items in the fallback assessments.
    assert_eq!(record.components.len(), 4);
    assert_eq!(
        component_types(&record),
        vec![
            ComponentType::Introduction,
            ComponentType::MainContent,
            ComponentType::InteractiveActivities,
            ComponentType::Conclusion,
        ]
    );
    assert_eq!(record.components[0].content, "Introduction to Photosynthesis");
    assert_eq!(record.quality_score, Some(7.0));
    assert!(record.feedback.is_empty());
    assert!(record.metadata.learning_objectives.is_empty());

    let last = sink.events().pop().unwrap();
    assert_eq!(last.progress, 100);
    assert_eq!(last.status, ProgressStatus::Completed);
}

#[tokio::test]
async fn formative_component_present_only_with_items() {
    for with_formative in [true, false] {
        let client = Arc::new(ScriptedClient::new([
            curriculum_json(),
            content_json(),
            assessment_json_with_formative(with_formative),
            review_json(),
        ]));
        let record = pipeline(client, Arc::new(RecordingSink::new()))
            .generate_lesson(&photosynthesis_request(), SessionId::new())
            .await
            .unwrap();

        let has_formative = record
            .components
            .iter()
            .any(|c| c.component_type == ComponentType::FormativeAssessment);
        assert_eq!(has_formative, with_formative);
        assert_eq!(record.components.len(), if with_formative { 5 } else { 4 });
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_is_monotonic_and_ends_completed() {
    let sink = Arc::new(RecordingSink::new());
    let session_id = SessionId::new();
    pipeline(Arc::new(ScriptedClient::canned()), sink.clone())
        .generate_lesson(&photosynthesis_request(), session_id)
        .await
        .unwrap();

    let events = sink.events();
    let progress: Vec<u8> = events.iter().map(|e| e.progress).collect();
    assert_eq!(progress, vec![5, 25, 30, 60, 65, 80, 85, 90, 95, 98, 100]);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(events.iter().all(|e| e.session_id == session_id));

    let (last, rest) = events.split_last().unwrap();
    assert_eq!(last.current_stage, "Complete");
    assert_eq!(last.status, ProgressStatus::Completed);
    assert_eq!(
        last.message.as_deref(),
        Some("Lesson generation completed successfully")
    );
    assert!(rest.iter().all(|e| e.status == ProgressStatus::InProgress));

    let stages: Vec<&str> = rest.iter().map(|e| e.current_stage.as_str()).collect();
    assert_eq!(
        stages,
        vec![
            "CurriculumExpert",
            "CurriculumExpert",
            "ContentCreator",
            "ContentCreator",
            "AssessmentAgent",
            "AssessmentAgent",
            "LessonCompiler",
            "QualityReviewAgent",
            "QualityReviewAgent",
            "LessonAssembler",
        ]
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn backend_failure_at_each_stage_emits_one_failed_event() {
    let cases = [
        (1, Stage::Curriculum),
        (2, Stage::Content),
        (3, Stage::Assessment),
        (4, Stage::Review),
    ];

    for (call, stage) in cases {
        let client = Arc::new(FailingClient::on_call(call));
        let sink = Arc::new(RecordingSink::new());
        let session_id = SessionId::new();

        let err = pipeline(client.clone(), sink.clone())
            .generate_lesson(&photosynthesis_request(), session_id)
            .await
            .unwrap_err();

        let PipelineError::Stage { stage: failed, .. } = &err;
        assert_eq!(*failed, stage);
        assert_eq!(err.stage(), stage);
        // No further calls after the failing one.
        assert_eq!(client.calls(), call);

        let events = sink.events();
        let failed_events: Vec<_> = events
            .iter()
            .filter(|e| e.status == ProgressStatus::Failed)
            .collect();
        assert_eq!(failed_events.len(), 1, "stage {stage}");

        let last = events.last().unwrap();
        assert_eq!(last.status, ProgressStatus::Failed);
        assert_eq!(last.progress, 0);
        assert_eq!(last.current_stage, "Error");
        assert_eq!(last.session_id, session_id);
        let cause = last.error.as_deref().unwrap();
        assert!(cause.contains("503"));
        assert_eq!(
            last.message.as_deref(),
            Some(format!("Generation failed: {cause}").as_str())
        );
        assert!(
            !events
                .iter()
                .any(|e| e.status == ProgressStatus::Completed)
        );
    }
}

#[tokio::test]
async fn missing_queue_entries_fail_the_run() {
    let client = Arc::new(ScriptedClient::new([curriculum_json()]));
    let sink = Arc::new(RecordingSink::new());
    let err = pipeline(client, sink)
        .generate_lesson(&photosynthesis_request(), SessionId::new())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Content);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_runs_keep_their_session_ids() {
    let client = Arc::new(StageClient::canned());
    let sink = Arc::new(RecordingSink::new());
    let pipeline = Arc::new(pipeline(client.clone(), sink.clone()));

    let ids: Vec<SessionId> = (0..4).map(|_| SessionId::new()).collect();
    let mut handles = Vec::new();
    for id in ids.clone() {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            pipeline.generate_lesson(&photosynthesis_request(), id).await
        }));
    }
    for handle in handles {
        let record = handle.await.unwrap().unwrap();
        assert_eq!(record.components.len(), 5);
    }

    assert_eq!(client.calls(), 16);
    for id in ids {
        let events = sink.events_for(id);
        assert_eq!(events.len(), 11);
        let progress: Vec<u8> = events.iter().map(|e| e.progress).collect();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(events.last().unwrap().status, ProgressStatus::Completed);
    }
}
