//! Assessment context: the attempt orchestrator.
//!
//! An `AssessmentContext` is created per attempt, configured once from a
//! resolved definition, then driven through `start`, navigation and
//! responses, `stop`, and `eval`. It is exclusively owned by its attempt and
//! never shared between threads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::DeliveryError;
use crate::item::ItemContext;
use crate::model::{AssessmentControl, AssessmentDefinition, FeedbackContent, FeedbackRule};
use crate::parser::AssessmentDocument;
use crate::scoring::{sum_max, ScoreModel};
use crate::section::SectionContext;
use crate::variables::{VariableStore, SCORE};

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unconfigured,
    NotStarted,
    InProgress,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unconfigured => write!(f, "unconfigured"),
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Feedback selected by the feedback rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackOutput {
    /// Identifier the matching rule referenced.
    pub ident: String,
    /// Content for that identifier, when the document defines it.
    pub content: Option<FeedbackContent>,
}

/// Runtime state of one attempt.
pub struct AssessmentContext {
    clock: Box<dyn Clock>,
    state: SessionState,
    ident: String,
    title: String,
    objectives: Option<String>,
    sections: Vec<SectionContext>,
    current_section: Option<usize>,
    start_time: Option<i64>,
    stop_time: Option<i64>,
    duration_limit: Option<u64>,
    score_model: ScoreModel,
    cut_value: Option<f64>,
    control: AssessmentControl,
    feedback_rules: Vec<FeedbackRule>,
    feedback_testing: bool,
    feedback_available: bool,
    output: Option<FeedbackOutput>,
    survey: bool,
}

impl Default for AssessmentContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssessmentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentContext")
            .field("ident", &self.ident)
            .field("state", &self.state)
            .field("sections", &self.sections.len())
            .field("current_section", &self.current_section)
            .field("start_time", &self.start_time)
            .field("stop_time", &self.stop_time)
            .field("duration_limit", &self.duration_limit)
            .field("score_model", &self.score_model)
            .finish_non_exhaustive()
    }
}

impl AssessmentContext {
    /// Unconfigured context timed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Unconfigured context timed by `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            state: SessionState::Unconfigured,
            ident: String::new(),
            title: String::new(),
            objectives: None,
            sections: Vec::new(),
            current_section: None,
            start_time: None,
            stop_time: None,
            duration_limit: None,
            score_model: ScoreModel::default(),
            cut_value: None,
            control: AssessmentControl::default(),
            feedback_rules: Vec::new(),
            feedback_testing: false,
            feedback_available: false,
            output: None,
            survey: false,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Resolve `doc` and configure the attempt from it.
    pub fn setup(&mut self, doc: &AssessmentDocument) -> Result<(), DeliveryError> {
        if self.state != SessionState::Unconfigured {
            return Err(DeliveryError::AlreadyConfigured);
        }
        let definition = doc.resolve()?;
        self.setup_definition(definition)
    }

    /// Configure the attempt from an already resolved definition.
    pub fn setup_definition(&mut self, def: AssessmentDefinition) -> Result<(), DeliveryError> {
        if self.state != SessionState::Unconfigured {
            return Err(DeliveryError::AlreadyConfigured);
        }
        if def.sections.is_empty() {
            return Err(DeliveryError::NoSections(def.ident));
        }

        self.sections = def.sections.iter().map(SectionContext::new).collect();
        self.ident = def.ident;
        self.title = def.title;
        self.objectives = def.objectives;
        self.duration_limit = def.duration_limit_ms.filter(|&ms| ms > 0);
        self.score_model = def.outcomes.score_model;
        self.cut_value = def.outcomes.cut_value;
        self.control = def.control;
        self.feedback_testing = def.control.feedback && !def.outcomes.feedback_rules.is_empty();
        self.feedback_rules = def.outcomes.feedback_rules;
        self.survey = def.survey;

        self.current_section = None;
        self.start_time = None;
        self.stop_time = None;
        self.feedback_available = false;
        self.output = None;
        self.state = SessionState::NotStarted;

        tracing::debug!(
            assessment = %self.ident,
            sections = self.sections.len(),
            limit_ms = ?self.duration_limit,
            model = %self.score_model,
            "assessment configured"
        );
        Ok(())
    }

    /// Start the attempt. Does nothing if it was already started.
    pub fn start(&mut self) -> Result<(), DeliveryError> {
        if self.state == SessionState::Unconfigured {
            return Err(DeliveryError::NotConfigured);
        }
        if self.start_time.is_some() {
            return Ok(());
        }
        let now = self.clock.now_millis();
        self.start_time = Some(now);
        self.state = SessionState::InProgress;
        tracing::debug!(assessment = %self.ident, start = now, "attempt started");
        Ok(())
    }

    /// Stop the attempt and let the current section freeze its item.
    ///
    /// Does nothing if the attempt never started or was already stopped.
    pub fn stop(&mut self) {
        if self.start_time.is_none() || self.stop_time.is_some() {
            return;
        }
        let now = self.clock.now_millis();
        self.stop_time = Some(now);
        self.state = SessionState::Stopped;
        if let Some(section) = self.current_section.and_then(|pos| self.sections.get_mut(pos)) {
            section.section_was_submitted();
        }
        tracing::debug!(assessment = %self.ident, stop = now, "attempt stopped");
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_time.is_some()
    }

    /// Whether the attempt may still accept answers: true if it has not
    /// started, has no time limit, or is still within the limit.
    pub fn is_open(&self) -> bool {
        let (Some(start), Some(limit)) = (self.start_time, self.duration_limit) else {
            return true;
        };
        self.clock.now_millis() < start.saturating_add(limit_millis(limit))
    }

    /// Milliseconds left before the limit, or `None` when unlimited.
    pub fn remaining_time(&self) -> Option<u64> {
        let limit = self.duration_limit?;
        let Some(start) = self.start_time else {
            return Some(limit);
        };
        let end = self.stop_time.unwrap_or_else(|| self.clock.now_millis());
        let left = start.saturating_add(limit_millis(limit)).saturating_sub(end);
        Some(left.max(0) as u64)
    }

    /// Milliseconds since start, frozen at stop. 0 before start.
    pub fn elapsed(&self) -> i64 {
        match (self.start_time, self.stop_time) {
            (None, _) => 0,
            (Some(start), Some(stop)) => stop - start,
            (Some(start), None) => self.clock.now_millis() - start,
        }
    }

    /// `stop - start` once both are recorded, 0 before that.
    pub fn duration(&self) -> i64 {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => stop - start,
            _ => 0,
        }
    }

    pub fn start_time(&self) -> Option<i64> {
        self.start_time
    }

    pub fn stop_time(&self) -> Option<i64> {
        self.stop_time
    }

    pub fn duration_limit(&self) -> Option<u64> {
        self.duration_limit
    }

    // -----------------------------------------------------------------------
    // Scoring
    // -----------------------------------------------------------------------

    /// Evaluate all sections, then select feedback.
    ///
    /// Surveys are never scored, so this is a no-op for them.
    pub fn eval(&mut self) -> Result<(), DeliveryError> {
        if self.state == SessionState::Unconfigured {
            return Err(DeliveryError::NotConfigured);
        }
        if self.survey {
            tracing::debug!(assessment = %self.ident, "survey, skipping evaluation");
            return Ok(());
        }
        for section in &mut self.sections {
            section.eval();
        }
        if self.feedback_testing {
            self.resolve_feedback();
        }
        tracing::debug!(
            assessment = %self.ident,
            score = self.score(),
            passed = self.is_passed(),
            "assessment evaluated"
        );
        Ok(())
    }

    /// Run every feedback rule in document order. Each match overwrites the
    /// output, so the last matching rule is the one reported.
    fn resolve_feedback(&mut self) {
        let total = self.score();
        self.feedback_available = false;
        self.output = None;
        for rule in &self.feedback_rules {
            if rule.condition.evaluate(total) {
                self.output = Some(FeedbackOutput {
                    ident: rule.feedback_ident.clone(),
                    content: rule.content.clone(),
                });
                self.feedback_available = true;
            }
        }
    }

    /// Top-level score under the configured scoring model.
    pub fn score(&self) -> f64 {
        let scores: Vec<f64> = self.sections.iter().map(SectionContext::score).collect();
        self.score_model.reduce(&scores, self.cut_value)
    }

    /// Sum of section maxima, or `None` if any section maximum is unknown.
    pub fn max_score(&self) -> Option<f64> {
        sum_max(self.sections.iter().map(SectionContext::max_score))
    }

    /// `score() >= cut`. Without a cut value the attempt never passes.
    pub fn is_passed(&self) -> bool {
        match self.cut_value {
            Some(cut) => self.score() >= cut,
            None => false,
        }
    }

    /// Outcome store of the assessment, holding the current total score.
    pub fn variables(&self) -> VariableStore {
        VariableStore::from_values([(SCORE, self.score())])
    }

    pub fn score_model(&self) -> ScoreModel {
        self.score_model
    }

    pub fn cut_value(&self) -> Option<f64> {
        self.cut_value
    }

    pub fn is_survey(&self) -> bool {
        self.survey
    }

    pub fn is_feedback_available(&self) -> bool {
        self.feedback_available
    }

    pub fn feedback_output(&self) -> Option<&FeedbackOutput> {
        self.output.as_ref()
    }

    pub fn is_feedback_testing(&self) -> bool {
        self.feedback_testing
    }

    // -----------------------------------------------------------------------
    // Structure & metadata
    // -----------------------------------------------------------------------

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn objectives(&self) -> Option<&str> {
        self.objectives.as_deref()
    }

    pub fn control(&self) -> AssessmentControl {
        self.control
    }

    pub fn sections(&self) -> &[SectionContext] {
        &self.sections
    }

    pub fn section(&self, pos: usize) -> Option<&SectionContext> {
        self.sections.get(pos)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(SectionContext::item_count).sum()
    }

    /// Position of the section and item with the given idents.
    pub fn locate(
        &self,
        section_ident: &str,
        item_ident: &str,
    ) -> Result<(usize, usize), DeliveryError> {
        let section = self
            .sections
            .iter()
            .position(|s| s.ident() == section_ident)
            .ok_or_else(|| DeliveryError::UnknownIdent(section_ident.to_string()))?;
        let item = self.sections[section]
            .position_of(item_ident)
            .ok_or_else(|| DeliveryError::UnknownIdent(item_ident.to_string()))?;
        Ok((section, item))
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn current_section(&self) -> Option<usize> {
        self.current_section
    }

    pub fn current_section_context(&self) -> Option<&SectionContext> {
        self.current_section.and_then(|pos| self.sections.get(pos))
    }

    pub fn set_current_section(&mut self, pos: usize) -> Result<(), DeliveryError> {
        self.ensure_configured()?;
        if pos >= self.sections.len() {
            return Err(DeliveryError::NoSuchSection(pos));
        }
        self.current_section = Some(pos);
        Ok(())
    }

    /// Move both cursors and mark the item presented.
    pub fn set_current_item(&mut self, section: usize, item: usize) -> Result<(), DeliveryError> {
        self.set_current_section(section)?;
        if !self.sections[section].set_current_item(item) {
            return Err(DeliveryError::NoSuchItem { section, item });
        }
        Ok(())
    }

    /// Advance to the next item, crossing into the next non-empty section
    /// when the current one is exhausted. Returns the new position, or
    /// `None` (cursors unchanged) at the end of the assessment.
    pub fn next_item(&mut self) -> Result<Option<(usize, usize)>, DeliveryError> {
        self.ensure_configured()?;
        let (mut section, mut item) = match self.current_section {
            None => (0, 0),
            Some(s) => match self.sections[s].current_item() {
                None => (s, 0),
                Some(i) => (s, i + 1),
            },
        };
        while section < self.sections.len() {
            if item < self.sections[section].item_count() {
                self.set_current_item(section, item)?;
                return Ok(Some((section, item)));
            }
            section += 1;
            item = 0;
        }
        Ok(None)
    }

    /// Absolute position of the current item within the whole assessment.
    pub fn item_position(&self) -> Option<usize> {
        let first = self.first_item_position_in_section()?;
        let within = self.current_section_context()?.current_item()?;
        Some(first + within)
    }

    /// Absolute position of the current section's first item.
    pub fn first_item_position_in_section(&self) -> Option<usize> {
        let current = self.current_section?;
        Some(
            self.sections[..current]
                .iter()
                .map(SectionContext::item_count)
                .sum(),
        )
    }

    /// Absolute position of the current section's last item. `None` for an
    /// empty section.
    pub fn last_item_position_in_section(&self) -> Option<usize> {
        let first = self.first_item_position_in_section()?;
        let count = self.current_section_context()?.item_count();
        (count > 0).then(|| first + count - 1)
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Record the outcome variables of an item's response.
    pub fn record_outcomes(
        &mut self,
        section: usize,
        item: usize,
        outcomes: VariableStore,
    ) -> Result<(), DeliveryError> {
        self.ensure_accepting()?;
        let target = self.item_mut(section, item)?;
        if !target.record(outcomes) {
            return Err(DeliveryError::Closed("item is closed"));
        }
        Ok(())
    }

    /// Drop the current response of an item.
    pub fn clear_response(&mut self, section: usize, item: usize) -> Result<(), DeliveryError> {
        self.ensure_accepting()?;
        if !self.item_mut(section, item)?.clear() {
            return Err(DeliveryError::Closed("item is closed"));
        }
        Ok(())
    }

    fn item_mut(
        &mut self,
        section: usize,
        item: usize,
    ) -> Result<&mut ItemContext, DeliveryError> {
        self.sections
            .get_mut(section)
            .ok_or(DeliveryError::NoSuchSection(section))?
            .item_mut(item)
            .ok_or(DeliveryError::NoSuchItem { section, item })
    }

    fn ensure_configured(&self) -> Result<(), DeliveryError> {
        match self.state {
            SessionState::Unconfigured => Err(DeliveryError::NotConfigured),
            _ => Ok(()),
        }
    }

    fn ensure_accepting(&self) -> Result<(), DeliveryError> {
        match self.state {
            SessionState::Unconfigured => Err(DeliveryError::NotConfigured),
            SessionState::NotStarted => Err(DeliveryError::Closed("attempt not started")),
            SessionState::Stopped => Err(DeliveryError::Closed("attempt stopped")),
            SessionState::InProgress if !self.is_open() => {
                Err(DeliveryError::Closed("time limit exceeded"))
            }
            SessionState::InProgress => Ok(()),
        }
    }
}

/// Clock arithmetic is i64; longer limits never expire.
fn limit_millis(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
