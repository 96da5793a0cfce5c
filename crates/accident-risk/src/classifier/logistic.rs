use super::{binary_classes, Classifier, ClassifierError};
use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;

/// JSON export of a fitted binary logistic regression.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegressionSpec {
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    classes: [i64; 2],
    coefficients: Array1<f64>,
    intercept: f64,
}

impl TryFrom<LogisticRegressionSpec> for LogisticRegression {
    type Error = ClassifierError;

    fn try_from(spec: LogisticRegressionSpec) -> Result<Self, Self::Error> {
        let classes = binary_classes(&spec.classes)?;
        if spec.coefficients.is_empty() {
            return Err(ClassifierError::InvalidModel(
                "logistic regression has no coefficients".to_string(),
            ));
        }

        Ok(Self {
            classes,
            coefficients: Array1::from(spec.coefficients),
            intercept: spec.intercept,
        })
    }
}

impl LogisticRegression {
    fn decision_function(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, ClassifierError> {
        if rows.ncols() != self.coefficients.len() {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: rows.ncols(),
            });
        }
        Ok(rows.dot(&self.coefficients) + self.intercept)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticRegression {
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<i64>, ClassifierError> {
        let scores = self.decision_function(rows)?;
        Ok(scores.mapv(|z| {
            if z > 0.0 {
                self.classes[1]
            } else {
                self.classes[0]
            }
        }))
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, ClassifierError> {
        let scores = self.decision_function(rows)?;
        let mut proba = Array2::zeros((scores.len(), 2));
        for (mut out, z) in proba.rows_mut().into_iter().zip(scores.iter()) {
            let positive = sigmoid(*z);
            out[0] = 1.0 - positive;
            out[1] = positive;
        }
        Ok(proba)
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> LogisticRegression {
        LogisticRegression::try_from(LogisticRegressionSpec {
            classes: vec![0, 1],
            coefficients: vec![2.0, -1.0],
            intercept: -0.5,
        })
        .expect("model builds")
    }

    #[test]
    fn probabilities_follow_the_sigmoid() {
        let proba = model()
            .predict_proba(array![[1.0, 0.0], [0.0, 0.0]].view())
            .expect("scores");
        assert!((proba[[0, 1]] - sigmoid(1.5)).abs() < 1e-12);
        assert!((proba[[1, 1]] - sigmoid(-0.5)).abs() < 1e-12);
        assert!((proba[[1, 0]] + proba[[1, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn predict_uses_the_decision_boundary() {
        let labels = model()
            .predict(array![[1.0, 0.0], [0.0, 1.0]].view())
            .expect("predicts");
        assert_eq!(labels.to_vec(), vec![1, 0]);
    }

    #[test]
    fn width_must_match_coefficients() {
        let err = model()
            .predict(array![[1.0, 0.0, 3.0]].view())
            .expect_err("wide row rejected");
        assert!(matches!(
            err,
            ClassifierError::ShapeMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }
}
