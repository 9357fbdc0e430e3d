//! Outcome variables and the per-unit variable store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Conventional name of the score-bearing outcome variable.
pub const SCORE: &str = "SCORE";

/// A named numeric outcome attached to an item or an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: f64,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Mapping from variable name to variable for one scored unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    vars: HashMap<String, Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from plain `name = value` pairs.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut store = Self::new();
        for (name, value) in values {
            store.insert(Variable::new(name, value));
        }
        store
    }

    /// Insert or replace a variable, keyed by its name.
    pub fn insert(&mut self, var: Variable) -> Option<Variable> {
        self.vars.insert(var.name.clone(), var)
    }

    /// Set a variable's value, creating it if needed.
    pub fn set_value(&mut self, name: &str, value: f64) {
        match self.vars.get_mut(name) {
            Some(var) => var.value = value,
            None => {
                self.insert(Variable::new(name, value));
            }
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// Locate the score-bearing variable.
    ///
    /// Returns the variable named `SCORE` if present. Otherwise, if the store
    /// holds exactly one variable, that lone variable is taken as the score.
    /// Any other shape yields `None`, which callers treat as a zero
    /// contribution.
    pub fn score_variable(&self) -> Option<&Variable> {
        if let Some(score) = self.vars.get(SCORE) {
            return Some(score);
        }
        if self.vars.len() == 1 {
            return self.vars.values().next();
        }
        None
    }

    /// Value of the score variable, or 0 when there is none.
    pub fn score(&self) -> f64 {
        self.score_variable().map(|v| v.value).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_named_variable_wins() {
        let store = VariableStore::from_values([("SCORE", 2.0), ("BONUS", 1.0)]);
        assert_eq!(store.score_variable().map(|v| v.value), Some(2.0));
    }

    #[test]
    fn lone_variable_is_the_score() {
        let store = VariableStore::from_values([("points", 3.5)]);
        let var = store.score_variable().unwrap();
        assert_eq!(var.name, "points");
        assert_eq!(store.score(), 3.5);
    }

    #[test]
    fn ambiguous_store_has_no_score() {
        let store = VariableStore::from_values([("a", 1.0), ("b", 2.0)]);
        assert!(store.score_variable().is_none());
        assert_eq!(store.score(), 0.0);
    }

    #[test]
    fn empty_store_has_no_score() {
        let store = VariableStore::new();
        assert!(store.score_variable().is_none());
        assert_eq!(store.score(), 0.0);
    }

    #[test]
    fn score_named_variable_with_many_others() {
        let store =
            VariableStore::from_values([("a", 1.0), ("SCORE", 0.5), ("b", 2.0), ("c", 9.0)]);
        assert_eq!(store.score(), 0.5);
    }

    #[test]
    fn direct_lookup() {
        let store = VariableStore::from_values([("a", 1.0)]);
        assert!(store.variable("a").is_some());
        assert!(store.variable("SCORE").is_none());
    }

    #[test]
    fn set_value_creates_and_updates() {
        let mut store = VariableStore::new();
        store.set_value("SCORE", 1.0);
        store.set_value("SCORE", 2.0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.score(), 2.0);
    }
}
