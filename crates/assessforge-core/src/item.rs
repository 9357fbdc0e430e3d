//! Item context: the scored leaf of an attempt.

use crate::model::ItemDefinition;
use crate::variables::{VariableStore, SCORE};

/// Runtime state of one item within an attempt.
///
/// Response matching happens outside this crate; the item only holds the
/// outcome variables it was handed and reduces them to a single score.
#[derive(Debug, Clone)]
pub struct ItemContext {
    ident: String,
    title: String,
    max_score: Option<f64>,
    outcomes: VariableStore,
    presented: bool,
    times_answered: u32,
    closed: bool,
    score: f64,
}

impl ItemContext {
    pub fn new(def: &ItemDefinition) -> Self {
        Self {
            ident: def.ident.clone(),
            title: def.title.clone(),
            max_score: def.max_score,
            outcomes: VariableStore::new(),
            presented: false,
            times_answered: 0,
            closed: false,
            score: 0.0,
        }
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_score(&self) -> Option<f64> {
        self.max_score
    }

    /// Outcome variables of the current response.
    pub fn outcomes(&self) -> &VariableStore {
        &self.outcomes
    }

    pub fn mark_presented(&mut self) {
        self.presented = true;
    }

    pub fn is_presented(&self) -> bool {
        self.presented
    }

    /// An item is answered while it holds a response.
    pub fn is_answered(&self) -> bool {
        !self.outcomes.is_empty()
    }

    /// An item is attempted once a response was recorded, even if it was
    /// cleared afterwards.
    pub fn is_attempted(&self) -> bool {
        self.times_answered > 0
    }

    pub fn times_answered(&self) -> u32 {
        self.times_answered
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Replace the item's outcomes with a new response. Returns `false` if
    /// the item no longer accepts responses.
    pub fn record(&mut self, outcomes: VariableStore) -> bool {
        if self.closed {
            return false;
        }
        self.outcomes = outcomes;
        self.times_answered += 1;
        true
    }

    /// Drop the current response. Returns `false` if the item is closed.
    pub fn clear(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.outcomes.clear();
        true
    }

    /// Stop accepting responses. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Evaluate the item and return its outcome store.
    ///
    /// The score is the store's score variable, or 0 when no variable can be
    /// identified as the score.
    pub fn eval(&mut self) -> &VariableStore {
        self.score = self.outcomes.score();
        &self.outcomes
    }

    /// Score from the last `eval`.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Outcome store to publish for this item, with `SCORE` always present.
    pub fn scored_variables(&self) -> VariableStore {
        let mut store = self.outcomes.clone();
        if store.variable(SCORE).is_none() {
            store.set_value(SCORE, self.score);
        }
        store
    }
}
