//! Resolved assessment definition.
//!
//! This is the owned, typed tree produced once per attempt from a source
//! document. Section references are already replaced by the sections they
//! point at, scoring models and feedback conditions are closed enums, and the
//! duration is in milliseconds. Sections and items are addressed by their
//! position.

use serde::{Deserialize, Serialize};

use crate::condition::TestNode;
use crate::scoring::ScoreModel;

/// A fully resolved assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDefinition {
    pub ident: String,
    pub title: String,
    /// Time limit in milliseconds. `None` means unlimited.
    pub duration_limit_ms: Option<u64>,
    pub control: AssessmentControl,
    pub objectives: Option<String>,
    pub outcomes: OutcomesProcessing,
    /// Surveys are delivered but never scored.
    pub survey: bool,
    pub sections: Vec<SectionDefinition>,
}

impl AssessmentDefinition {
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// The `assessmentcontrol` switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentControl {
    pub feedback: bool,
    pub hints: bool,
    pub solutions: bool,
}

impl Default for AssessmentControl {
    fn default() -> Self {
        Self {
            feedback: true,
            hints: true,
            solutions: true,
        }
    }
}

/// Scoring configuration of an assessment or section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomesProcessing {
    pub score_model: ScoreModel,
    /// Pass threshold, and the per-child threshold under number-correct.
    pub cut_value: Option<f64>,
    /// Ordered feedback rules.
    pub feedback_rules: Vec<FeedbackRule>,
}

/// A condition plus the feedback it selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRule {
    /// Identifier of the referenced feedback.
    pub feedback_ident: String,
    pub condition: TestNode,
    /// Referenced content, when the document defines it.
    pub content: Option<FeedbackContent>,
}

/// Assessment-level feedback content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackContent {
    pub ident: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub ident: String,
    pub title: String,
    pub objectives: Option<String>,
    pub score_model: ScoreModel,
    pub cut_value: Option<f64>,
    pub items: Vec<ItemDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub ident: String,
    pub title: String,
    /// Maximum attainable score, when declared.
    pub max_score: Option<f64>,
}
