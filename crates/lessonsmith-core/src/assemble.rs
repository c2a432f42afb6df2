//! Final assembly of a [`LessonRecord`].

use chrono::Utc;

use crate::types::{
    CurriculumAnalysis, GenerationRequest, LessonComponent, LessonMetadata, LessonRecord,
    QualityReview,
};

/// Version stamped on every generated lesson.
pub const LESSON_VERSION: &str = "1.0";

/// Merge request fields with the curriculum analysis.
pub fn build_metadata(request: &GenerationRequest, analysis: &CurriculumAnalysis) -> LessonMetadata {
    LessonMetadata {
        subject: request.subject.clone(),
        grade_level: request.grade_level.clone(),
        topic: request.topic.clone(),
        subtopics: request.subtopics.clone(),
        learning_objectives: analysis.learning_objectives.clone(),
        standards_alignment: analysis.standards_alignment.clone(),
        difficulty_level: request.difficulty_level.clone(),
        estimated_duration: request.estimated_duration.clone(),
        prerequisites: analysis.prerequisites.clone(),
        target_skills: analysis.target_skills.clone(),
    }
}

/// Combine every stage output into the lesson returned to the caller.
///
/// The record id stays `0`; a store assigns the real one.
pub fn assemble(
    request: &GenerationRequest,
    analysis: &CurriculumAnalysis,
    components: Vec<LessonComponent>,
    review: &QualityReview,
) -> LessonRecord {
    LessonRecord {
        id: 0,
        title: request.lesson_title(),
        metadata: build_metadata(request, analysis),
        components,
        quality_score: Some(review.overall()),
        feedback: review.recommendations.clone(),
        version: LESSON_VERSION.to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QualityScores;

    fn analysis() -> CurriculumAnalysis {
        CurriculumAnalysis {
            learning_objectives: vec!["Solve quadratics".to_string()],
            standards_alignment: vec!["NCERT Maths Ch. 4".to_string()],
            prerequisites: vec!["Linear equations".to_string()],
            target_skills: vec!["Factoring".to_string()],
            recommended_duration: "40 minutes".to_string(),
            curriculum_analysis: String::new(),
        }
    }

    fn review() -> QualityReview {
        QualityReview {
            quality_scores: QualityScores::uniform(8.0),
            overall_score: Some(8.2),
            strengths: vec!["Clear".to_string()],
            areas_for_improvement: vec![],
            detailed_feedback: "Good".to_string(),
            recommendations: vec!["Add word problems".to_string()],
        }
    }

    #[test]
    fn title_and_version() {
        let request = GenerationRequest::new("Mathematics", "10", "Quadratic Equations");
        let record = assemble(&request, &analysis(), vec![], &review());
        assert_eq!(record.title, "Quadratic Equations - Mathematics Lesson");
        assert_eq!(record.version, "1.0");
        assert_eq!(record.id, 0);
    }

    #[test]
    fn metadata_merges_request_and_analysis() {
        let request = GenerationRequest::new("Mathematics", "10", "Quadratic Equations")
            .with_subtopics(["factoring"])
            .with_difficulty("advanced")
            .with_duration("60 minutes");
        let metadata = build_metadata(&request, &analysis());
        assert_eq!(metadata.subject, "Mathematics");
        assert_eq!(metadata.subtopics, vec!["factoring"]);
        assert_eq!(metadata.difficulty_level, "advanced");
        assert_eq!(metadata.estimated_duration, "60 minutes");
        assert_eq!(metadata.learning_objectives, vec!["Solve quadratics"]);
        assert_eq!(metadata.standards_alignment, vec!["NCERT Maths Ch. 4"]);
        assert_eq!(metadata.prerequisites, vec!["Linear equations"]);
        assert_eq!(metadata.target_skills, vec!["Factoring"]);
    }

    #[test]
    fn feedback_is_review_recommendations() {
        let request = GenerationRequest::new("Mathematics", "10", "Quadratic Equations");
        let record = assemble(&request, &analysis(), vec![], &review());
        assert_eq!(record.feedback, vec!["Add word problems"]);
        assert_eq!(record.quality_score, Some(8.2));
    }
}
