//! Scoring models and the reductions they apply to child scores.
//!
//! The same two reductions are used at section level (over item scores) and
//! at assessment level (over section scores).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// How child scores are reduced into a parent score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreModel {
    /// Sum of all child scores.
    #[default]
    SumOfScores,
    /// Number of children whose score reaches the cut value.
    NumberCorrect,
}

impl ScoreModel {
    /// Resolve the `scoremodel` string of an outcomes processing block.
    /// An absent model means sum-of-scores.
    pub fn from_definition(name: Option<&str>) -> Result<Self, DeliveryError> {
        match name.map(str::trim) {
            None | Some("") => Ok(ScoreModel::SumOfScores),
            Some(name) => name.parse(),
        }
    }

    /// Reduce child scores into a parent score.
    pub fn reduce(self, scores: &[f64], cut_value: Option<f64>) -> f64 {
        match self {
            ScoreModel::SumOfScores => scores.iter().sum(),
            ScoreModel::NumberCorrect => count_correct(scores, cut_value) as f64,
        }
    }
}

impl fmt::Display for ScoreModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreModel::SumOfScores => write!(f, "SumOfScores"),
            ScoreModel::NumberCorrect => write!(f, "NumberCorrect"),
        }
    }
}

impl FromStr for ScoreModel {
    type Err = DeliveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SumOfScores" => Ok(ScoreModel::SumOfScores),
            "NumberCorrect" => Ok(ScoreModel::NumberCorrect),
            other => Err(DeliveryError::UnsupportedScoreModel(other.to_string())),
        }
    }
}

/// Count scores that reach `cut_value`. Without a cut value nothing counts.
pub fn count_correct(scores: &[f64], cut_value: Option<f64>) -> usize {
    match cut_value {
        Some(cut) => scores.iter().filter(|&&s| s >= cut).count(),
        None => 0,
    }
}

/// Sum maxima, propagating an unknown maximum.
pub fn sum_max(maxima: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    maxima.into_iter().sum()
}
