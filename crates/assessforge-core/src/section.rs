//! Section context: aggregates item scores.

use crate::item::ItemContext;
use crate::model::SectionDefinition;
use crate::scoring::{sum_max, ScoreModel};
use crate::variables::{VariableStore, SCORE};

/// Runtime state of one section within an attempt.
#[derive(Debug, Clone)]
pub struct SectionContext {
    ident: String,
    title: String,
    objectives: Option<String>,
    score_model: ScoreModel,
    cut_value: Option<f64>,
    items: Vec<ItemContext>,
    current_item: Option<usize>,
    score: f64,
    presented: usize,
    answered: usize,
    attempted: usize,
    submitted: bool,
}

impl SectionContext {
    pub fn new(def: &SectionDefinition) -> Self {
        Self {
            ident: def.ident.clone(),
            title: def.title.clone(),
            objectives: def.objectives.clone(),
            score_model: def.score_model,
            cut_value: def.cut_value,
            items: def.items.iter().map(ItemContext::new).collect(),
            current_item: None,
            score: 0.0,
            presented: 0,
            answered: 0,
            attempted: 0,
            submitted: false,
        }
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn objectives(&self) -> Option<&str> {
        self.objectives.as_deref()
    }

    pub fn score_model(&self) -> ScoreModel {
        self.score_model
    }

    pub fn cut_value(&self) -> Option<f64> {
        self.cut_value
    }

    pub fn items(&self) -> &[ItemContext] {
        &self.items
    }

    pub fn item(&self, pos: usize) -> Option<&ItemContext> {
        self.items.get(pos)
    }

    pub fn item_mut(&mut self, pos: usize) -> Option<&mut ItemContext> {
        self.items.get_mut(pos)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn position_of(&self, item_ident: &str) -> Option<usize> {
        self.items.iter().position(|i| i.ident() == item_ident)
    }

    pub fn current_item(&self) -> Option<usize> {
        self.current_item
    }

    /// Move the cursor to `pos` and mark that item presented. Returns `false`
    /// when `pos` is out of range.
    pub fn set_current_item(&mut self, pos: usize) -> bool {
        match self.items.get_mut(pos) {
            Some(item) => {
                item.mark_presented();
                self.current_item = Some(pos);
                true
            }
            None => false,
        }
    }

    /// Evaluate every item and aggregate.
    pub fn eval(&mut self) {
        let mut scores = Vec::with_capacity(self.items.len());
        let (mut presented, mut answered, mut attempted) = (0, 0, 0);

        for item in &mut self.items {
            item.eval();
            scores.push(item.score());
            presented += usize::from(item.is_presented());
            answered += usize::from(item.is_answered());
            attempted += usize::from(item.is_attempted());
        }

        self.score = self.score_model.reduce(&scores, self.cut_value);
        self.presented = presented;
        self.answered = answered;
        self.attempted = attempted;

        tracing::debug!(
            section = %self.ident,
            model = %self.score_model,
            score = self.score,
            presented,
            answered,
            attempted,
            "evaluated section"
        );
    }

    /// Score from the last `eval`.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Sum of item maxima, or `None` if any item's maximum is unknown.
    pub fn max_score(&self) -> Option<f64> {
        sum_max(self.items.iter().map(ItemContext::max_score))
    }

    pub fn presented_count(&self) -> usize {
        self.presented
    }

    pub fn answered_count(&self) -> usize {
        self.answered
    }

    pub fn attempted_count(&self) -> usize {
        self.attempted
    }

    /// Outcome store of the section after `eval`.
    pub fn variables(&self) -> VariableStore {
        VariableStore::from_values([(SCORE, self.score)])
    }

    /// Freeze the item currently in progress. Called once from the owning
    /// assessment's `stop`; further calls do nothing.
    pub fn section_was_submitted(&mut self) {
        if self.submitted {
            return;
        }
        self.submitted = true;
        if let Some(item) = self.current_item.and_then(|pos| self.items.get_mut(pos)) {
            item.close();
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}
