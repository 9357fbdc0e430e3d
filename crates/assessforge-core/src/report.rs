//! Attempt report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::{AssessmentContext, FeedbackOutput, SessionState};
use crate::scoring::ScoreModel;
use crate::section::SectionContext;
use crate::variables::VariableStore;

/// Snapshot of a finished (or in-flight) attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub assessment: AssessmentSummary,
    pub state: SessionState,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    /// `stop - start` in milliseconds, 0 if the attempt never stopped.
    pub duration_ms: i64,
    pub score: f64,
    /// `None` when any item's maximum is unknown.
    pub max_score: Option<f64>,
    pub passed: bool,
    pub sections: Vec<SectionReport>,
    pub feedback: Option<FeedbackOutput>,
}

/// Summary of the assessment definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub ident: String,
    pub title: String,
    pub score_model: ScoreModel,
    pub cut_value: Option<f64>,
    pub duration_limit_ms: Option<u64>,
    pub survey: bool,
    pub item_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReport {
    pub ident: String,
    pub title: String,
    pub score: f64,
    pub max_score: Option<f64>,
    pub presented: usize,
    pub answered: usize,
    pub attempted: usize,
    pub items: Vec<ItemReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub ident: String,
    pub title: String,
    pub score: f64,
    pub max_score: Option<f64>,
    pub presented: bool,
    pub answered: bool,
    pub attempted: bool,
    pub outcomes: VariableStore,
}

impl AttemptReport {
    /// Build a report from the current state of `ctx`.
    pub fn from_context(ctx: &AssessmentContext) -> Self {
        let millis = |ms: Option<i64>| ms.and_then(DateTime::<Utc>::from_timestamp_millis);

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            assessment: AssessmentSummary {
                ident: ctx.ident().to_string(),
                title: ctx.title().to_string(),
                score_model: ctx.score_model(),
                cut_value: ctx.cut_value(),
                duration_limit_ms: ctx.duration_limit(),
                survey: ctx.is_survey(),
                item_count: ctx.item_count(),
            },
            state: ctx.state(),
            started_at: millis(ctx.start_time()),
            stopped_at: millis(ctx.stop_time()),
            duration_ms: ctx.duration(),
            score: ctx.score(),
            max_score: ctx.max_score(),
            passed: ctx.is_passed(),
            sections: ctx.sections().iter().map(section_report).collect(),
            feedback: ctx.feedback_output().cloned(),
        }
    }

    /// Score as a fraction of the maximum, when the maximum is known and
    /// positive.
    pub fn ratio(&self) -> Option<f64> {
        self.max_score
            .filter(|&max| max > 0.0)
            .map(|max| self.score / max)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "## {} ({})\n\n",
            self.assessment.title, self.assessment.ident
        ));
        md.push_str(&format!(
            "**Score:** {} / {} | **Passed:** {} | **Duration:** {:.1}s\n\n",
            self.score,
            format_max(self.max_score),
            if self.passed { "yes" } else { "no" },
            self.duration_ms as f64 / 1000.0
        ));

        md.push_str("| Section | Score | Max | Presented | Answered | Attempted |\n");
        md.push_str("|---------|-------|-----|-----------|----------|-----------|\n");
        for s in &self.sections {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                s.ident,
                s.score,
                format_max(s.max_score),
                s.presented,
                s.answered,
                s.attempted
            ));
        }

        if let Some(fb) = &self.feedback {
            md.push_str("\n### Feedback\n\n");
            match &fb.content {
                Some(content) => {
                    md.push_str(&format!("**{}**\n\n{}\n", content.title, content.text))
                }
                None => md.push_str(&format!("`{}`\n", fb.ident)),
            }
        }

        md
    }
}

/// Render an optional maximum, with `-1` standing for unknown.
pub fn format_max(max: Option<f64>) -> String {
    match max {
        Some(max) => max.to_string(),
        None => "-1".to_string(),
    }
}

fn section_report(section: &SectionContext) -> SectionReport {
    SectionReport {
        ident: section.ident().to_string(),
        title: section.title().to_string(),
        score: section.score(),
        max_score: section.max_score(),
        presented: section.presented_count(),
        answered: section.answered_count(),
        attempted: section.attempted_count(),
        items: section
            .items()
            .iter()
            .map(|item| ItemReport {
                ident: item.ident().to_string(),
                title: item.title().to_string(),
                score: item.score(),
                max_score: item.max_score(),
                presented: item.is_presented(),
                answered: item.is_answered(),
                attempted: item.is_attempted(),
                outcomes: item.scored_variables(),
            })
            .collect(),
    }
}
