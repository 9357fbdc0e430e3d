//! Replaying recorded responses through an attempt.
//!
//! A responses file lists, in order, the outcome variables that external
//! response matching produced for each item, optionally with the offset from
//! the start of the attempt at which they were submitted. Replaying drives a
//! fresh `AssessmentContext` on a manual clock, so time limits apply exactly
//! as they would have live.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assessment::AssessmentContext;
use crate::clock::ManualClock;
use crate::error::DeliveryError;
use crate::model::AssessmentDefinition;
use crate::variables::VariableStore;

/// Recorded responses for one attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseSet {
    /// Offset of `stop` from the start, in milliseconds. Defaults to the
    /// offset of the last response.
    #[serde(default)]
    pub finished_at_ms: Option<i64>,
    #[serde(default)]
    pub responses: Vec<RecordedResponse>,
}

/// One submission for one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub section: String,
    pub item: String,
    /// Offset from the start of the attempt, in milliseconds.
    #[serde(default)]
    pub at_ms: Option<i64>,
    /// Outcome variables; ordered only for stable serialization.
    #[serde(default)]
    pub outcomes: BTreeMap<String, f64>,
    /// Withdraw the item's current response instead of recording one.
    #[serde(default)]
    pub clear: bool,
}

/// What happened to the recorded responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub accepted: usize,
    /// Responses refused because the attempt or item was closed.
    pub rejected: usize,
}

/// Parse a TOML responses file.
pub fn parse_responses(path: &Path) -> Result<ResponseSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses file: {}", path.display()))?;
    parse_responses_str(&content, path)
}

/// Parse a TOML responses string (useful for testing).
pub fn parse_responses_str(content: &str, source_path: &Path) -> Result<ResponseSet> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse responses TOML: {}", source_path.display()))
}

/// Run a complete attempt: setup, start, responses, stop, eval.
///
/// Responses naming an unknown section or item abort the replay. Responses
/// arriving after the attempt closed are counted as rejected.
pub fn replay_attempt(
    definition: AssessmentDefinition,
    responses: &ResponseSet,
    start_millis: i64,
) -> Result<(AssessmentContext, ReplaySummary)> {
    let clock = ManualClock::new(start_millis);
    let mut ctx = AssessmentContext::with_clock(clock.clone());
    ctx.setup_definition(definition)?;
    ctx.start()?;

    let mut summary = ReplaySummary::default();
    let mut last_offset = 0i64;

    for response in &responses.responses {
        if let Some(offset) = response.at_ms {
            let at = start_millis.checked_add(offset).with_context(|| {
                format!(
                    "offset {offset} ms for response {}/{} is out of range",
                    response.section, response.item
                )
            })?;
            clock.set(at);
            last_offset = offset;
        }

        let (section, item) = ctx
            .locate(&response.section, &response.item)
            .with_context(|| format!("response for {}/{}", response.section, response.item))?;

        if ctx.is_open() && !ctx.is_stopped() {
            ctx.set_current_item(section, item)?;
        }

        let outcome = if response.clear {
            ctx.clear_response(section, item)
        } else {
            let store = VariableStore::from_values(
                response.outcomes.iter().map(|(name, value)| (name.clone(), *value)),
            );
            ctx.record_outcomes(section, item, store)
        };

        match outcome {
            Ok(()) => summary.accepted += 1,
            Err(DeliveryError::Closed(reason)) => {
                tracing::warn!(
                    section = %response.section,
                    item = %response.item,
                    "response rejected: {reason}"
                );
                summary.rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let finished = responses.finished_at_ms.unwrap_or(last_offset);
    let end = start_millis
        .checked_add(finished)
        .with_context(|| format!("finished_at_ms {finished} is out of range"))?;
    clock.set(end);
    ctx.stop();
    ctx.eval()?;

    tracing::info!(
        assessment = %ctx.ident(),
        accepted = summary.accepted,
        rejected = summary.rejected,
        score = ctx.score(),
        "replayed attempt"
    );

    Ok((ctx, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document_str;
    use std::path::PathBuf;

    const DEFINITION: &str = r#"
[assessment]
ident = "timed"
duration = "PT1M"

[assessment.outcomes_processing]
cutvalue = 2.0

[[assessment.sections]]
ident = "s1"
items = [{ ident = "q1", max_score = 1.0 }, { ident = "q2", max_score = 1.0 }]

[[assessment.sections]]
ident = "s2"
items = [{ ident = "q3", max_score = 1.0 }]
"#;

    fn definition() -> AssessmentDefinition {
        parse_document_str(DEFINITION, &PathBuf::from("def.toml"))
            .unwrap()
            .resolve()
            .unwrap()
    }

    fn responses(content: &str) -> ResponseSet {
        parse_responses_str(content, &PathBuf::from("responses.toml")).unwrap()
    }

    #[test]
    fn replays_within_limit() {
        let set = responses(
            r#"
[[responses]]
section = "s1"
item = "q1"
at_ms = 1000
outcomes = { SCORE = 1.0 }

[[responses]]
section = "s2"
item = "q3"
at_ms = 20000
outcomes = { SCORE = 1.0 }
"#,
        );
        let (ctx, summary) = replay_attempt(definition(), &set, 0).unwrap();
        assert_eq!(summary, ReplaySummary { accepted: 2, rejected: 0 });
        assert_eq!(ctx.score(), 2.0);
        assert!(ctx.is_passed());
        assert_eq!(ctx.duration(), 20_000);
        assert_eq!(ctx.current_section(), Some(1));
    }

    #[test]
    fn late_responses_are_rejected() {
        let set = responses(
            r#"
finished_at_ms = 61000

[[responses]]
section = "s1"
item = "q1"
at_ms = 59999
outcomes = { SCORE = 1.0 }

[[responses]]
section = "s1"
item = "q2"
at_ms = 60001
outcomes = { SCORE = 1.0 }
"#,
        );
        let (ctx, summary) = replay_attempt(definition(), &set, 1_000).unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(ctx.score(), 1.0);
        assert!(!ctx.is_passed());
        assert_eq!(ctx.duration(), 61_000);
    }

    #[test]
    fn out_of_range_offset_is_an_error() {
        let set = responses(
            r#"
[[responses]]
section = "s1"
item = "q1"
at_ms = 9223372036854775807
outcomes = { SCORE = 1.0 }
"#,
        );
        let err = replay_attempt(definition(), &set, 1_000).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("out of range"), "{message}");
        assert!(message.contains("s1/q1"), "{message}");

        let set = responses("finished_at_ms = 9223372036854775807\n");
        let err = replay_attempt(definition(), &set, 1_000).unwrap_err();
        assert!(err.to_string().contains("finished_at_ms"));
    }

    #[test]
    fn cleared_response_counts_attempted_not_answered() {
        let set = responses(
            r#"
[[responses]]
section = "s1"
item = "q1"
outcomes = { SCORE = 1.0 }

[[responses]]
section = "s1"
item = "q1"
clear = true
"#,
        );
        let (ctx, _) = replay_attempt(definition(), &set, 0).unwrap();
        let s1 = &ctx.sections()[0];
        assert_eq!(s1.answered_count(), 0);
        assert_eq!(s1.attempted_count(), 1);
        assert_eq!(ctx.score(), 0.0);
    }

    #[test]
    fn unknown_item_aborts() {
        let set = responses(
            r#"
[[responses]]
section = "s1"
item = "nope"
outcomes = { SCORE = 1.0 }
"#,
        );
        let err = replay_attempt(definition(), &set, 0).unwrap_err();
        assert!(format!("{err:#}").contains("unknown identifier: nope"));
    }
}
