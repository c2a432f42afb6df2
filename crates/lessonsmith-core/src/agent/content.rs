//! Lesson content: introduction, main body, activities and wrap-up.

use super::{Agent, LessonBrief, join_list};
use crate::types::{
    ActivitiesSection, IntroductionSection, LessonContent, MainContentSection, WrapUpSection,
};

pub const NAME: &str = "ContentCreator";

const TEMPERATURE: f32 = 0.3;

const ROLE_INSTRUCTION: &str = "\
You are an expert educational content creator who develops engaging, \
age-appropriate lesson content for CBSE Class 10 students in India. Your expertise:

1. Clear, step-by-step explanations that build understanding progressively.
2. Relatable examples and real-world applications relevant to Indian students.
3. Interactive elements and activities that promote active learning.
4. Adapting content for visual, auditory and kinesthetic learners.
5. Storytelling and narrative techniques that make abstract concepts concrete.
6. Culturally relevant content appropriate to the Indian educational context.

Create pedagogically sound, engaging content aligned with the CBSE curriculum.";

const OUTPUT_SHAPE: &str = r#"{
    "introduction": {
        "content": "detailed introduction content",
        "duration": "time estimate",
        "teaching_strategies": ["strategy1", "strategy2"]
    },
    "main_content": {
        "content": "detailed main content",
        "duration": "time estimate",
        "examples": ["example1", "example2"],
        "key_concepts": ["concept1", "concept2"]
    },
    "activities": {
        "content": "detailed activity descriptions",
        "duration": "time estimate",
        "materials_needed": ["material1", "material2"],
        "instructions": ["step1", "step2"]
    },
    "wrap_up": {
        "content": "summary and conclusion",
        "duration": "time estimate",
        "key_takeaways": ["takeaway1", "takeaway2"]
    }
}"#;

fn build_prompt(brief: &LessonBrief<'_>) -> String {
    let request = brief.request;
    let mut prompt = String::with_capacity(2048);
    prompt.push_str("Create comprehensive lesson content for:\n");
    prompt.push_str(&format!("Subject: {}\n", request.subject));
    prompt.push_str(&format!("Topic: {}\n", request.topic));
    prompt.push_str(&format!("Subtopics: {}\n", join_list(&request.subtopics)));
    prompt.push_str(&format!(
        "Learning Objectives: {}\n\n",
        join_list(brief.learning_objectives)
    ));
    prompt.push_str(
        "Generate the following lesson components:\n\
         1. Introduction (5-10 minutes) - Hook, relevance, overview\n\
         2. Main Content (20-30 minutes) - Detailed explanations with examples\n\
         3. Interactive Activities (10-15 minutes) - Engaging student activities\n\
         4. Wrap-up (5 minutes) - Summary and preview of next lesson\n\n\
         Each component should be detailed, engaging, and include specific teaching strategies.\n\n",
    );
    prompt.push_str("Format as JSON:\n");
    prompt.push_str(OUTPUT_SHAPE);
    prompt
}

fn fallback(brief: &LessonBrief<'_>, _raw: &str) -> LessonContent {
    let topic = &brief.request.topic;
    LessonContent {
        introduction: Some(IntroductionSection {
            content: format!("Introduction to {topic}"),
            duration: "10 minutes".to_string(),
            teaching_strategies: Vec::new(),
        }),
        main_content: Some(MainContentSection {
            content: format!("Main content about {topic}"),
            duration: "25 minutes".to_string(),
            examples: Vec::new(),
            key_concepts: Vec::new(),
        }),
        activities: Some(ActivitiesSection {
            content: format!("Interactive activities for {topic}"),
            duration: "15 minutes".to_string(),
            materials_needed: Vec::new(),
            instructions: Vec::new(),
        }),
        wrap_up: Some(WrapUpSection {
            content: format!("Summary of {topic}"),
            duration: "5 minutes".to_string(),
            key_takeaways: Vec::new(),
        }),
    }
}

/// The content generation agent.
pub fn generator<'a>() -> Agent<LessonBrief<'a>, LessonContent> {
    Agent::new(NAME, ROLE_INSTRUCTION, TEMPERATURE, build_prompt, fallback)
}
