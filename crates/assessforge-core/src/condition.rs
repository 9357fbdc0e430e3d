//! Feedback conditions.
//!
//! A condition is a small boolean tree evaluated against the assessment's
//! total score once scoring is complete.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// Comparison applied by a `variable_test` leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparator {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::Eq => lhs == rhs,
            Comparator::Neq => lhs != rhs,
            Comparator::Lt => lhs < rhs,
            Comparator::Lte => lhs <= rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Gte => lhs >= rhs,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Eq => "eq",
            Comparator::Neq => "neq",
            Comparator::Lt => "lt",
            Comparator::Lte => "lte",
            Comparator::Gt => "gt",
            Comparator::Gte => "gte",
        };
        f.write_str(s)
    }
}

impl FromStr for Comparator {
    type Err = DeliveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eq" | "=" | "==" => Ok(Comparator::Eq),
            "neq" | "ne" | "!=" => Ok(Comparator::Neq),
            "lt" | "<" => Ok(Comparator::Lt),
            "lte" | "le" | "<=" => Ok(Comparator::Lte),
            "gt" | ">" => Ok(Comparator::Gt),
            "gte" | "ge" | ">=" => Ok(Comparator::Gte),
            other => Err(DeliveryError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// Leaf comparison of the total score against a fixed operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTest {
    pub comparator: Comparator,
    pub value: f64,
}

/// A feedback condition node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestNode {
    Variable(VariableTest),
    And(Vec<TestNode>),
    Or(Vec<TestNode>),
    Not(Box<TestNode>),
}

impl TestNode {
    pub fn variable(comparator: Comparator, value: f64) -> Self {
        TestNode::Variable(VariableTest { comparator, value })
    }

    /// Evaluate the tree against the current total score.
    ///
    /// `and`/`or` evaluate every child before reducing; an empty `and` holds,
    /// an empty `or` does not.
    pub fn evaluate(&self, total_score: f64) -> bool {
        match self {
            TestNode::Variable(test) => test.comparator.apply(total_score, test.value),
            TestNode::And(children) => children
                .iter()
                .map(|c| c.evaluate(total_score))
                .fold(true, |acc, r| acc && r),
            TestNode::Or(children) => children
                .iter()
                .map(|c| c.evaluate(total_score))
                .fold(false, |acc, r| acc || r),
            TestNode::Not(child) => !child.evaluate(total_score),
        }
    }

    /// Name of the node kind as written in definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            TestNode::Variable(_) => "variable_test",
            TestNode::And(_) => "and_test",
            TestNode::Or(_) => "or_test",
            TestNode::Not(_) => "not_test",
        }
    }
}
