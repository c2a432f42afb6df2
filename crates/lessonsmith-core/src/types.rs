//! Data model shared by every pipeline stage.
//!
//! Field names serialize in `snake_case`; the same names appear in the JSON
//! shapes the agents ask the model to return, so these types double as the
//! interchange format between the generation client and the pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Default difficulty when the caller does not specify one.
pub const DEFAULT_DIFFICULTY: &str = "intermediate";

/// Default target duration for a lesson.
pub const DEFAULT_DURATION: &str = "45 minutes";

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subject: String,
    pub grade_level: String,
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: String,
    #[serde(default = "default_duration")]
    pub estimated_duration: String,
    /// Identifiers of uploaded reference documents, assigned by the caller's store.
    #[serde(default)]
    pub reference_document_ids: Vec<i64>,
    /// Text extracted from reference documents, passed to the curriculum stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplementary_context: Option<String>,
}

impl GenerationRequest {
    /// Create a request with default difficulty and duration.
    pub fn new(
        subject: impl Into<String>,
        grade_level: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            grade_level: grade_level.into(),
            topic: topic.into(),
            subtopics: Vec::new(),
            difficulty_level: default_difficulty(),
            estimated_duration: default_duration(),
            reference_document_ids: Vec::new(),
            supplementary_context: None,
        }
    }

    pub fn with_subtopics<I, S>(mut self, subtopics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtopics = subtopics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty_level = difficulty.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.estimated_duration = duration.into();
        self
    }

    pub fn with_reference_documents(mut self, ids: Vec<i64>) -> Self {
        self.reference_document_ids = ids;
        self
    }

    pub fn with_supplementary_context(mut self, text: impl Into<String>) -> Self {
        self.supplementary_context = Some(text.into());
        self
    }

    /// Title of the lesson this request produces.
    pub fn lesson_title(&self) -> String {
        format!("{} - {} Lesson", self.topic, self.subject)
    }
}

// ---------------------------------------------------------------------------
// Curriculum analysis
// ---------------------------------------------------------------------------

/// Output of the curriculum stage; consumed by every later stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumAnalysis {
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub standards_alignment: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub target_skills: Vec<String>,
    #[serde(default = "default_duration")]
    pub recommended_duration: String,
    /// Free-text analysis.
    #[serde(default)]
    pub curriculum_analysis: String,
}

// ---------------------------------------------------------------------------
// Lesson content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroductionSection {
    pub content: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub teaching_strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainContentSection {
    pub content: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitiesSection {
    pub content: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub materials_needed: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapUpSection {
    pub content: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
}

/// Output of the content stage. A section the model omitted is `None` and
/// yields no component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonContent {
    #[serde(default)]
    pub introduction: Option<IntroductionSection>,
    #[serde(default)]
    pub main_content: Option<MainContentSection>,
    #[serde(default)]
    pub activities: Option<ActivitiesSection>,
    #[serde(default)]
    pub wrap_up: Option<WrapUpSection>,
}

// ---------------------------------------------------------------------------
// Assessments
// ---------------------------------------------------------------------------

/// Label for a formative item the backend left untyped.
pub const DEFAULT_ASSESSMENT_KIND: &str = "Assessment";

fn default_assessment_kind() -> String {
    DEFAULT_ASSESSMENT_KIND.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormativeAssessment {
    #[serde(rename = "type", default = "default_assessment_kind")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timing: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummativeAssessment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub rubric: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelfAssessment {
    #[serde(default)]
    pub reflection_questions: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
}

/// Output of the assessment stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssessmentSet {
    #[serde(default)]
    pub formative_assessments: Vec<FormativeAssessment>,
    #[serde(default)]
    pub summative_assessment: SummativeAssessment,
    #[serde(default)]
    pub self_assessment: SelfAssessment,
    #[serde(default)]
    pub evaluation_criteria: Vec<String>,
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Kind of a compiled lesson component, in lesson order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentType {
    #[serde(rename = "Introduction")]
    Introduction,
    #[serde(rename = "Main Content")]
    MainContent,
    #[serde(rename = "Interactive Activities")]
    InteractiveActivities,
    #[serde(rename = "Formative Assessment")]
    FormativeAssessment,
    #[serde(rename = "Conclusion")]
    Conclusion,
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Introduction => "Introduction",
            Self::MainContent => "Main Content",
            Self::InteractiveActivities => "Interactive Activities",
            Self::FormativeAssessment => "Formative Assessment",
            Self::Conclusion => "Conclusion",
        };
        f.write_str(s)
    }
}

/// One ordered block of the final lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonComponent {
    pub component_type: ComponentType,
    /// 1-based position within the lesson.
    pub order: u32,
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Quality review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub curriculum_alignment: f64,
    pub content_quality: f64,
    pub engagement_level: f64,
    pub assessment_effectiveness: f64,
    pub pedagogical_soundness: f64,
}

impl QualityScores {
    /// Every dimension set to `score`.
    pub fn uniform(score: f64) -> Self {
        Self {
            curriculum_alignment: score,
            content_quality: score,
            engagement_level: score,
            assessment_effectiveness: score,
            pedagogical_soundness: score,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.curriculum_alignment
            + self.content_quality
            + self.engagement_level
            + self.assessment_effectiveness
            + self.pedagogical_soundness)
            / 5.0
    }
}

/// Output of the review stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReview {
    pub quality_scores: QualityScores,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub detailed_feedback: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl QualityReview {
    /// The reported overall score, or the mean of the sub-scores when the
    /// model left it out.
    pub fn overall(&self) -> f64 {
        self.overall_score
            .unwrap_or_else(|| self.quality_scores.mean())
    }
}

// ---------------------------------------------------------------------------
// Final record
// ---------------------------------------------------------------------------

/// Request fields merged with the curriculum analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonMetadata {
    pub subject: String,
    pub grade_level: String,
    pub topic: String,
    pub subtopics: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub standards_alignment: Vec<String>,
    pub difficulty_level: String,
    pub estimated_duration: String,
    pub prerequisites: Vec<String>,
    pub target_skills: Vec<String>,
}

/// The assembled lesson returned by a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonRecord {
    /// Assigned by an external store; always `0` when produced by the pipeline.
    pub id: i64,
    pub title: String,
    pub metadata: LessonMetadata,
    pub components: Vec<LessonComponent>,
    pub quality_score: Option<f64>,
    pub feedback: Vec<String>,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Progress status
// ---------------------------------------------------------------------------

/// Status carried by a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for ProgressStatus {
    type Err = ProgressStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ProgressStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProgressStatus`] string.
#[derive(Debug, Clone)]
pub struct ProgressStatusParseError(pub String);

impl fmt::Display for ProgressStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid progress status: {:?}", self.0)
    }
}

impl std::error::Error for ProgressStatusParseError {}
