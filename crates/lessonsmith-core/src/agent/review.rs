//! Quality review of the assembled lesson-so-far.

use serde::Serialize;
use tracing::warn;

use super::Agent;
use crate::types::{
    AssessmentSet, CurriculumAnalysis, GenerationRequest, LessonComponent, LessonContent,
    QualityReview, QualityScores,
};

pub const NAME: &str = "QualityReviewAgent";

const TEMPERATURE: f32 = 0.1;

/// Score used for every dimension when the review cannot be decoded.
pub const FALLBACK_SCORE: f64 = 7.0;

const ROLE_INSTRUCTION: &str = "\
You are an expert educational quality assurance specialist with deep \
knowledge of pedagogical practice, CBSE curriculum standards and effective \
teaching methodology. Your responsibilities:

1. Review lesson plans for pedagogical soundness and curriculum alignment.
2. Evaluate content quality, accuracy and age-appropriateness.
3. Assess engagement and interactive elements.
4. Check for inclusive and diverse representation.
5. Verify that assessments align with the learning objectives.
6. Give constructive feedback and concrete improvement suggestions.
7. Rate overall lesson quality on multiple dimensions.

Give thorough, actionable feedback that improves lesson effectiveness.";

const OUTPUT_SHAPE: &str = r#"{
    "quality_scores": {
        "curriculum_alignment": score,
        "content_quality": score,
        "engagement_level": score,
        "assessment_effectiveness": score,
        "pedagogical_soundness": score
    },
    "overall_score": average_score,
    "strengths": ["strength1", "strength2"],
    "areas_for_improvement": ["area1", "area2"],
    "detailed_feedback": "comprehensive feedback text",
    "recommendations": ["recommendation1", "recommendation2"]
}"#;

/// Everything produced so far in a run, serialized into the review prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft<'a> {
    pub subject: &'a str,
    pub grade_level: &'a str,
    pub topic: &'a str,
    pub subtopics: &'a [String],
    pub curriculum_analysis: &'a CurriculumAnalysis,
    pub lesson_content: &'a LessonContent,
    pub assessments: &'a AssessmentSet,
    pub components: &'a [LessonComponent],
}

impl<'a> ReviewDraft<'a> {
    pub fn new(
        request: &'a GenerationRequest,
        curriculum_analysis: &'a CurriculumAnalysis,
        lesson_content: &'a LessonContent,
        assessments: &'a AssessmentSet,
        components: &'a [LessonComponent],
    ) -> Self {
        Self {
            subject: &request.subject,
            grade_level: &request.grade_level,
            topic: &request.topic,
            subtopics: &request.subtopics,
            curriculum_analysis,
            lesson_content,
            assessments,
            components,
        }
    }
}

fn build_prompt(draft: &ReviewDraft<'_>) -> String {
    let lesson_json = serde_json::to_string_pretty(draft).unwrap_or_else(|e| {
        warn!(error = %e, "failed to serialize lesson draft for review");
        String::from("{}")
    });

    let mut prompt = String::with_capacity(lesson_json.len() + 1536);
    prompt.push_str(
        "Review this complete lesson plan and provide comprehensive quality assessment:\n\n",
    );
    prompt.push_str("Lesson Data: ");
    prompt.push_str(&lesson_json);
    prompt.push_str(
        "\n\nEvaluate on these dimensions:\n\
         1. Curriculum Alignment (1-10)\n\
         2. Content Quality (1-10)\n\
         3. Engagement Level (1-10)\n\
         4. Assessment Effectiveness (1-10)\n\
         5. Pedagogical Soundness (1-10)\n\n\
         Provide:\n\
         - Detailed feedback for each dimension\n\
         - Overall quality score (1-10)\n\
         - Specific improvement recommendations\n\
         - Strengths of the lesson\n\n",
    );
    prompt.push_str("Format as JSON:\n");
    prompt.push_str(OUTPUT_SHAPE);
    prompt
}

fn fallback(_draft: &ReviewDraft<'_>, raw: &str) -> QualityReview {
    QualityReview {
        quality_scores: QualityScores::uniform(FALLBACK_SCORE),
        overall_score: Some(FALLBACK_SCORE),
        strengths: Vec::new(),
        areas_for_improvement: Vec::new(),
        detailed_feedback: raw.to_string(),
        recommendations: Vec::new(),
    }
}

/// The quality review agent.
pub fn reviewer<'a>() -> Agent<ReviewDraft<'a>, QualityReview> {
    Agent::new(NAME, ROLE_INSTRUCTION, TEMPERATURE, build_prompt, fallback)
}
