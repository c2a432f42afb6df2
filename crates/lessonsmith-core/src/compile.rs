//! Lesson compilation: turns generated content and assessments into the
//! ordered component list.
//!
//! Component order is fixed: Introduction, Main Content, Interactive
//! Activities, Formative Assessment, Conclusion. Absent sections are skipped
//! and ordinals are assigned after inclusion, so they always run `1..=N`.

use serde_json::{Map, Value, json};
use tracing::warn;

use crate::types::{AssessmentSet, ComponentType, FormativeAssessment, LessonComponent, LessonContent};

/// Build the ordered components for a lesson.
///
/// Pure: identical inputs yield identical output.
pub fn compile(content: &LessonContent, assessments: &AssessmentSet) -> Vec<LessonComponent> {
    let mut drafts: Vec<(ComponentType, String, Map<String, Value>)> = Vec::with_capacity(5);

    if let Some(intro) = &content.introduction {
        drafts.push((
            ComponentType::Introduction,
            intro.content.clone(),
            metadata([
                ("duration", json!(intro.duration)),
                ("teaching_strategies", json!(intro.teaching_strategies)),
            ]),
        ));
    }

    if let Some(main) = &content.main_content {
        drafts.push((
            ComponentType::MainContent,
            main.content.clone(),
            metadata([
                ("duration", json!(main.duration)),
                ("examples", json!(main.examples)),
                ("key_concepts", json!(main.key_concepts)),
            ]),
        ));
    }

    if let Some(activities) = &content.activities {
        drafts.push((
            ComponentType::InteractiveActivities,
            activities.content.clone(),
            metadata([
                ("duration", json!(activities.duration)),
                ("materials_needed", json!(activities.materials_needed)),
                ("instructions", json!(activities.instructions)),
            ]),
        ));
    }

    if !assessments.formative_assessments.is_empty() {
        let items = serde_json::to_value(&assessments.formative_assessments).unwrap_or_else(|e| {
            warn!(error = %e, "failed to serialize formative assessments into metadata");
            Value::Array(Vec::new())
        });
        drafts.push((
            ComponentType::FormativeAssessment,
            formative_text(&assessments.formative_assessments),
            metadata([("assessment_type", json!("formative")), ("assessments", items)]),
        ));
    }

    if let Some(wrap_up) = &content.wrap_up {
        drafts.push((
            ComponentType::Conclusion,
            wrap_up.content.clone(),
            metadata([
                ("duration", json!(wrap_up.duration)),
                ("key_takeaways", json!(wrap_up.key_takeaways)),
            ]),
        ));
    }

    drafts
        .into_iter()
        .zip(1u32..)
        .map(|((component_type, content, metadata), order)| LessonComponent {
            component_type,
            order,
            content,
            metadata,
        })
        .collect()
}

/// Render formative items as one text block: a header, then each item's
/// type and description followed by its questions as bullets.
fn formative_text(items: &[FormativeAssessment]) -> String {
    let mut text = String::from("Formative Assessments:\n");
    for item in items {
        text.push_str(&format!("\n{}: {}\n", item.kind, item.description));
        for question in &item.questions {
            text.push_str(&format!("- {question}\n"));
        }
    }
    text
}

fn metadata<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
