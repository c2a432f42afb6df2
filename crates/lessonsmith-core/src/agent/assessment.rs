//! Assessments: formative checks, a summative assessment, self-assessment
//! and evaluation criteria.

use super::{Agent, LessonBrief, join_list};
use crate::types::{AssessmentSet, SelfAssessment, SummativeAssessment};

pub const NAME: &str = "AssessmentAgent";

const TEMPERATURE: f32 = 0.2;

const ROLE_INSTRUCTION: &str = "\
You are an expert in educational assessment and evaluation who designs \
assessment strategies for CBSE Class 10 students. Your expertise:

1. Formative and summative assessments aligned with learning objectives.
2. Assessment rubrics and scoring criteria.
3. Varied question types: MCQ, short answer, essay and practical.
4. Fair, valid and reliable assessments.
5. Peer assessment and self-reflection opportunities.
6. Adapting assessments to different learning needs and abilities.

Create assessments that measure understanding accurately while promoting learning.";

const OUTPUT_SHAPE: &str = r#"{
    "formative_assessments": [
        {
            "type": "assessment type",
            "description": "detailed description",
            "timing": "when to use",
            "questions": ["question1", "question2"]
        }
    ],
    "summative_assessment": {
        "type": "assessment type",
        "description": "detailed description",
        "questions": ["question1", "question2"],
        "rubric": "scoring criteria"
    },
    "self_assessment": {
        "reflection_questions": ["question1", "question2"],
        "checklist": ["item1", "item2"]
    },
    "evaluation_criteria": ["criteria1", "criteria2"]
}"#;

fn build_prompt(brief: &LessonBrief<'_>) -> String {
    let request = brief.request;
    let mut prompt = String::with_capacity(1536);
    prompt.push_str("Create comprehensive assessment strategies for:\n");
    prompt.push_str(&format!("Subject: {}\n", request.subject));
    prompt.push_str(&format!("Topic: {}\n", request.topic));
    prompt.push_str(&format!(
        "Learning Objectives: {}\n",
        join_list(brief.learning_objectives)
    ));
    prompt.push_str(&format!("Difficulty Level: {}\n\n", request.difficulty_level));
    prompt.push_str(
        "Design:\n\
         1. Formative assessments (during lesson)\n\
         2. Summative assessment (end of lesson)\n\
         3. Self-assessment opportunities\n\
         4. Evaluation criteria and rubrics\n\n",
    );
    prompt.push_str("Format as JSON:\n");
    prompt.push_str(OUTPUT_SHAPE);
    prompt
}

fn fallback(_brief: &LessonBrief<'_>, _raw: &str) -> AssessmentSet {
    AssessmentSet {
        formative_assessments: Vec::new(),
        summative_assessment: SummativeAssessment {
            kind: "quiz".to_string(),
            ..SummativeAssessment::default()
        },
        self_assessment: SelfAssessment::default(),
        evaluation_criteria: Vec::new(),
    }
}

/// The assessment generation agent.
pub fn generator<'a>() -> Agent<LessonBrief<'a>, AssessmentSet> {
    Agent::new(NAME, ROLE_INSTRUCTION, TEMPERATURE, build_prompt, fallback)
}
