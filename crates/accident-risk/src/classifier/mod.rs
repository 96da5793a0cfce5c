//! Scoring side of the exported model.
//!
//! The training pipeline serializes the fitted estimator to JSON; this module
//! rebuilds it behind the [`Classifier`] trait so the rest of the crate only
//! sees `predict` / `predict_proba` over a batch of rows.

mod forest;
mod logistic;

pub use forest::{DecisionNode, DecisionTree, NodeSpec, RandomForest, RandomForestSpec, TreeSpec};
pub use logistic::{LogisticRegression, LogisticRegressionSpec};

use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;

/// Label the model emits for locations it considers accident-prone.
pub const PRONE_CLASS: i64 = 1;

/// Batch classifier over dense feature rows.
pub trait Classifier: Send + Sync {
    /// Discrete label per row.
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<i64>, ClassifierError>;

    /// Class distribution per row, columns ordered as the model's classes.
    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, ClassifierError>;

    /// Short family name used in logs.
    fn kind(&self) -> &'static str;
}

/// Error raised while building or evaluating a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("feature vector has {actual} columns but the model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("classifier produced {0} class probabilities, expected 2")]
    UnexpectedOutput(usize),
    #[error("classifier produced no prediction")]
    EmptyOutput,
}

/// Serialized model as written by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(RandomForestSpec),
    LogisticRegression(LogisticRegressionSpec),
}

impl ModelSpec {
    /// Validate the spec and turn it into a ready-to-score classifier.
    pub fn build(self) -> Result<Box<dyn Classifier>, ClassifierError> {
        match self {
            ModelSpec::RandomForest(spec) => Ok(Box::new(RandomForest::try_from(spec)?)),
            ModelSpec::LogisticRegression(spec) => {
                Ok(Box::new(LogisticRegression::try_from(spec)?))
            }
        }
    }
}

fn binary_classes(classes: &[i64]) -> Result<[i64; 2], ClassifierError> {
    match classes {
        [negative, positive] if negative != positive => Ok([*negative, *positive]),
        other => Err(ClassifierError::InvalidModel(format!(
            "expected two distinct classes, found {other:?}"
        ))),
    }
}
