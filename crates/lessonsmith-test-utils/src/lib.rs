//! Shared test doubles for lessonsmith integration tests.
//!
//! - [`ScriptedClient`]: replays queued responses in call order.
//! - [`StageClient`]: answers each agent with the response registered for
//!   its role instruction, so concurrent runs can share one client.
//! - [`FailingClient`]: answers like [`StageClient`] until the Nth call,
//!   which fails with a backend error.
//! - [`RecordingSink`]: collects progress events.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use lessonsmith_core::agent::{
    assessment_generator, content_generator, curriculum_analyzer, quality_reviewer,
};
use lessonsmith_core::client::{CompletionRequest, GenerationClient, ServiceError};
use lessonsmith_core::progress::{ProgressEvent, ProgressSink, SessionId};
use lessonsmith_core::types::GenerationRequest;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A typical science request.
pub fn photosynthesis_request() -> GenerationRequest {
    GenerationRequest::new("Science", "10", "Photosynthesis")
        .with_subtopics(["light reaction", "dark reaction"])
}

pub fn curriculum_json() -> String {
    json!({
        "learning_objectives": [
            "Explain how plants convert light energy into chemical energy",
            "Identify the reactants and products of photosynthesis"
        ],
        "standards_alignment": ["CBSE Science Class 10, Chapter 6: Life Processes"],
        "prerequisites": ["Structure of a plant cell"],
        "target_skills": ["Scientific observation", "Diagram interpretation"],
        "recommended_duration": "45 minutes",
        "curriculum_analysis": "Core topic within Life Processes."
    })
    .to_string()
}

pub fn content_json() -> String {
    json!({
        "introduction": {
            "content": "Why are leaves green?",
            "duration": "10 minutes",
            "teaching_strategies": ["Questioning"]
        },
        "main_content": {
            "content": "Chlorophyll captures light; water splits; glucose forms.",
            "duration": "25 minutes",
            "examples": ["Variegated leaf starch test"],
            "key_concepts": ["Chlorophyll", "Stomata"]
        },
        "activities": {
            "content": "Starch test on a destarched plant.",
            "duration": "15 minutes",
            "materials_needed": ["Iodine solution", "Potted plant"],
            "instructions": ["Keep the plant in the dark for a day", "Test a leaf with iodine"]
        },
        "wrap_up": {
            "content": "Photosynthesis feeds almost every food chain.",
            "duration": "5 minutes",
            "key_takeaways": ["Light energy becomes chemical energy"]
        }
    })
    .to_string()
}

pub fn assessment_json() -> String {
    assessment_json_with_formative(true)
}

/// Assessment response with or without formative items.
pub fn assessment_json_with_formative(with_formative: bool) -> String {
    let formative = if with_formative {
        json!([{
            "type": "Exit Ticket",
            "description": "Two quick recall questions",
            "timing": "end of main content",
            "questions": ["Name the pigment that absorbs light.", "What gas is released?"]
        }])
    } else {
        json!([])
    };
    json!({
        "formative_assessments": formative,
        "summative_assessment": {
            "type": "Quiz",
            "description": "Five short-answer questions",
            "questions": ["Write the balanced equation for photosynthesis."],
            "rubric": "2 marks per question"
        },
        "self_assessment": {
            "reflection_questions": ["Which step confused me?"],
            "checklist": ["I can draw a labelled leaf section"]
        },
        "evaluation_criteria": ["Accuracy", "Use of terminology"]
    })
    .to_string()
}

pub fn review_json() -> String {
    json!({
        "quality_scores": {
            "curriculum_alignment": 9,
            "content_quality": 8,
            "engagement_level": 8,
            "assessment_effectiveness": 7,
            "pedagogical_soundness": 8
        },
        "overall_score": 8.0,
        "strengths": ["Hands-on starch test"],
        "areas_for_improvement": ["More visuals"],
        "detailed_feedback": "Solid lesson.",
        "recommendations": ["Add a labelled diagram of the chloroplast"]
    })
    .to_string()
}

fn status_error(call: usize) -> ServiceError {
    ServiceError::Status {
        status: 503,
        body: format!("backend unavailable on call {call}"),
    }
}

// ---------------------------------------------------------------------------
// ScriptedClient
// ---------------------------------------------------------------------------

/// Replays queued responses in call order and records every request.
///
/// When the queue is empty, returns the `always` text if set, otherwise
/// [`ServiceError::EmptyResponse`].
#[derive(Default)]
pub struct ScriptedClient {
    queue: Mutex<VecDeque<String>>,
    always: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Respond with `text` to every call.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            always: Some(text.into()),
            ..Self::default()
        }
    }

    /// The happy-path response for each agent, in pipeline order.
    pub fn canned() -> Self {
        Self::new([curriculum_json(), content_json(), assessment_json(), review_json()])
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.queue.lock().unwrap().pop_front();
        next.or_else(|| self.always.clone())
            .ok_or(ServiceError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// StageClient
// ---------------------------------------------------------------------------

/// Answers each agent by matching the system message against the agents'
/// role instructions.
pub struct StageClient {
    responses: HashMap<&'static str, String>,
    calls: AtomicUsize,
}

impl StageClient {
    pub fn new(curriculum: String, content: String, assessment: String, review: String) -> Self {
        let responses = HashMap::from([
            (curriculum_analyzer().role_instruction(), curriculum),
            (content_generator().role_instruction(), content),
            (assessment_generator().role_instruction(), assessment),
            (quality_reviewer().role_instruction(), review),
        ]);
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn canned() -> Self {
        Self::new(curriculum_json(), content_json(), assessment_json(), review_json())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(request.system.as_str())
            .cloned()
            .ok_or_else(|| ServiceError::MalformedResponse("unknown agent".to_string()))
    }
}

#[async_trait]
impl GenerationClient for StageClient {
    fn name(&self) -> &str {
        "stage"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.respond(request)
    }
}

// ---------------------------------------------------------------------------
// FailingClient
// ---------------------------------------------------------------------------

/// Succeeds with canned responses until call number `fail_on` (1-based),
/// which fails with a 503 status error.
pub struct FailingClient {
    inner: StageClient,
    fail_on: usize,
}

impl FailingClient {
    pub fn on_call(fail_on: usize) -> Self {
        Self {
            inner: StageClient::canned(),
            fail_on,
        }
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl GenerationClient for FailingClient {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let call = self.inner.calls() + 1;
        if call == self.fail_on {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return Err(status_error(call));
        }
        self.inner.respond(request)
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Collects every progress event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events belonging to one session.
    pub fn events_for(&self, session_id: SessionId) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.session_id == session_id)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
