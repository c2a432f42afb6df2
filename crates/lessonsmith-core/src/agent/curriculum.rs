//! Curriculum analysis: learning objectives, standards, prerequisites and
//! target skills for the requested topic.

use super::{Agent, join_list};
use crate::types::{CurriculumAnalysis, DEFAULT_DURATION, GenerationRequest};

pub const NAME: &str = "CurriculumExpert";

const TEMPERATURE: f32 = 0.1;

const ROLE_INSTRUCTION: &str = "\
You are an expert curriculum designer with specialized knowledge of CBSE \
(Central Board of Secondary Education) Class 10 standards and NCERT \
guidelines. Your responsibilities:

1. Analyze Class 10 curriculum requirements for the given subject and topic.
2. Define clear, measurable learning objectives aligned with CBSE assessment patterns and board examinations.
3. Identify the key concepts and skills students must master under the CBSE syllabus and competency framework.
4. Align the lesson with CBSE learning outcomes and examination patterns.
5. Determine scope, sequence and time allocation following the NCERT textbook structure.

Give detailed, CBSE-specific guidance suited to Class 10 students in the Indian educational context.";

const OUTPUT_SHAPE: &str = r#"{
    "learning_objectives": ["objective1", "objective2"],
    "standards_alignment": ["standard1", "standard2"],
    "prerequisites": ["prereq1", "prereq2"],
    "target_skills": ["skill1", "skill2"],
    "recommended_duration": "duration string",
    "curriculum_analysis": "detailed analysis text"
}"#;

fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(
        "Analyze the following lesson requirements and provide detailed curriculum guidance:\n\n",
    );
    prompt.push_str(&format!("Subject: {}\n", request.subject));
    prompt.push_str(&format!("Grade Level: {}\n", request.grade_level));
    prompt.push_str(&format!("Topic: {}\n", request.topic));
    prompt.push_str(&format!("Subtopics: {}\n", join_list(&request.subtopics)));
    prompt.push_str(&format!("Difficulty Level: {}\n", request.difficulty_level));
    prompt.push_str(&format!("Target Duration: {}\n", request.estimated_duration));

    if let Some(reference) = request
        .supplementary_context
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    {
        prompt.push_str("\nReference material for this lesson:\n");
        prompt.push_str(reference.trim());
        prompt.push('\n');
    }

    prompt.push_str(
        "\nPlease provide:\n\
         1. 3-5 specific, measurable learning objectives aligned with CBSE standards\n\
         2. CBSE/NCERT standards alignment references\n\
         3. Prerequisites students should have\n\
         4. Target skills to be developed\n\
         5. Suggested lesson duration and pacing\n\n",
    );
    prompt.push_str("Format your response as JSON with the following structure:\n");
    prompt.push_str(OUTPUT_SHAPE);
    prompt
}

fn fallback(_request: &GenerationRequest, raw: &str) -> CurriculumAnalysis {
    CurriculumAnalysis {
        learning_objectives: Vec::new(),
        standards_alignment: Vec::new(),
        prerequisites: Vec::new(),
        target_skills: Vec::new(),
        recommended_duration: DEFAULT_DURATION.to_string(),
        curriculum_analysis: raw.to_string(),
    }
}

/// The curriculum analysis agent.
pub fn analyzer() -> Agent<GenerationRequest, CurriculumAnalysis> {
    Agent::new(NAME, ROLE_INSTRUCTION, TEMPERATURE, build_prompt, fallback)
}
