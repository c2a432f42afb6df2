//! Stages and run states.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::{assessment, content, curriculum, review};

/// A step of the lesson pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Curriculum,
    Content,
    Assessment,
    Compile,
    Review,
    Assemble,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Curriculum,
        Stage::Content,
        Stage::Assessment,
        Stage::Compile,
        Stage::Review,
        Stage::Assemble,
    ];

    /// Label reported as `current_stage` in progress events.
    pub fn label(self) -> &'static str {
        match self {
            Self::Curriculum => curriculum::NAME,
            Self::Content => content::NAME,
            Self::Assessment => assessment::NAME,
            Self::Compile => "LessonCompiler",
            Self::Review => review::NAME,
            Self::Assemble => "LessonAssembler",
        }
    }

    /// Whether this stage calls the generation backend.
    pub fn calls_backend(self) -> bool {
        matches!(
            self,
            Self::Curriculum | Self::Content | Self::Assessment | Self::Review
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of a single run.
///
/// ```text
/// pending          -> running(first)
/// running(s)       -> running(next after s)
/// running(last)    -> completed
/// running(any)     -> failed
/// ```
///
/// `completed` and `failed` are terminal; there is no retry edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running(Stage),
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check whether `from -> to` is an edge in the run graph.
    pub fn is_valid_transition(from: RunState, to: RunState) -> bool {
        match (from, to) {
            (Self::Pending, Self::Running(first)) => first == Stage::Curriculum,
            (Self::Running(current), Self::Running(next)) => next_stage(current) == Some(next),
            (Self::Running(Stage::Assemble), Self::Completed) => true,
            (Self::Running(_), Self::Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Running(stage) => write!(f, "running({stage})"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

fn next_stage(stage: Stage) -> Option<Stage> {
    let idx = Stage::ALL.iter().position(|s| *s == stage)?;
    Stage::ALL.get(idx + 1).copied()
}
