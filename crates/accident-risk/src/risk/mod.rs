mod message;
mod tier;

pub use tier::RiskTier;

use crate::classifier::{Classifier, ClassifierError, PRONE_CLASS};
use crate::features::FeatureVector;
use crate::history::{HistoricalRecord, HistoricalStatistics};
use serde::Serialize;
use std::sync::Arc;

/// Per-request outcome combining model output with historical counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub is_accident_prone: bool,
    pub confidence: f64,
    pub risk_level: RiskTier,
    pub history: HistoricalRecord,
    pub message: String,
}

/// Scores encoded vectors and explains the result.
#[derive(Clone)]
pub struct RiskClassifier {
    model: Arc<dyn Classifier>,
    statistics: Arc<HistoricalStatistics>,
}

impl RiskClassifier {
    pub fn new(model: Arc<dyn Classifier>, statistics: Arc<HistoricalStatistics>) -> Self {
        Self { model, statistics }
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    /// The prone flag comes from the model's own discrete prediction, not from
    /// thresholding `confidence`; the two can disagree for some estimators.
    pub fn assess(
        &self,
        vector: &FeatureVector,
        place: &str,
        area: &str,
    ) -> Result<RiskAssessment, ClassifierError> {
        let rows = vector.rows();
        let label = self
            .model
            .predict(rows)?
            .get(0)
            .copied()
            .ok_or(ClassifierError::EmptyOutput)?;
        let proba = self.model.predict_proba(rows)?;
        if proba.nrows() == 0 {
            return Err(ClassifierError::EmptyOutput);
        }
        if proba.ncols() != 2 {
            return Err(ClassifierError::UnexpectedOutput(proba.ncols()));
        }

        let confidence = proba[[0, 1]];
        let is_accident_prone = label == PRONE_CLASS;
        let risk_level = RiskTier::from_confidence(confidence);
        let history = self.statistics.lookup(place, area);
        let message = message::compose(place, is_accident_prone, confidence, &history);

        Ok(RiskAssessment {
            is_accident_prone,
            confidence,
            risk_level,
            history,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::LocationStats;
    use ndarray::{array, Array1, Array2, ArrayView2};

    /// Returns fixed outputs regardless of input.
    struct FixedClassifier {
        label: i64,
        proba: [f64; 2],
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<i64>, ClassifierError> {
            Ok(Array1::from_elem(rows.nrows(), self.label))
        }

        fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, ClassifierError> {
            let mut out = Array2::zeros((rows.nrows(), 2));
            for mut row in out.rows_mut() {
                row[0] = self.proba[0];
                row[1] = self.proba[1];
            }
            Ok(out)
        }

        fn kind(&self) -> &'static str {
            "fixed"
        }
    }

    struct WideClassifier;

    impl Classifier for WideClassifier {
        fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<i64>, ClassifierError> {
            Ok(Array1::zeros(rows.nrows()))
        }

        fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, ClassifierError> {
            Ok(Array2::zeros((rows.nrows(), 3)))
        }

        fn kind(&self) -> &'static str {
            "wide"
        }
    }

    fn statistics() -> Arc<HistoricalStatistics> {
        Arc::new(HistoricalStatistics::new(vec![(
            "poblacion, mangaldan".to_string(),
            LocationStats {
                barangay: Some("poblacion".to_string()),
                station: Some("mangaldan".to_string()),
                total_accidents: 31,
                fatal_accidents: 4,
                most_common_offense: Some("Reckless Imprudence".to_string()),
                is_accident_prone: true,
            },
        )]))
    }

    fn facade(label: i64, proba: [f64; 2]) -> RiskClassifier {
        RiskClassifier::new(Arc::new(FixedClassifier { label, proba }), statistics())
    }

    fn vector() -> FeatureVector {
        FeatureVector::from_array(array![[12.0, 1.0, 22.0, 0.0]])
    }

    #[test]
    fn prone_assessment_merges_history() {
        let assessment = facade(1, [0.1, 0.9])
            .assess(&vector(), "poblacion", "mangaldan")
            .expect("assessment succeeds");

        assert!(assessment.is_accident_prone);
        assert_eq!(assessment.confidence, 0.9);
        assert_eq!(assessment.risk_level, RiskTier::Critical);
        assert_eq!(assessment.history.total_accidents, 31);
        assert_eq!(assessment.history.most_common_offense, "Reckless Imprudence");
        assert!(assessment.message.contains("POBLACION"));
        assert!(assessment.message.contains("(4 fatal)"));
    }

    #[test]
    fn unknown_location_has_empty_history() {
        let assessment = facade(0, [0.8, 0.2])
            .assess(&vector(), "test_barangay", "dagupan city")
            .expect("assessment succeeds");

        assert!(!assessment.is_accident_prone);
        assert_eq!(assessment.risk_level, RiskTier::Low);
        assert_eq!(assessment.history, HistoricalRecord::default());
        assert_eq!(
            assessment.message,
            "TEST_BARANGAY appears safe - 20% confidence in low risk."
        );
    }

    #[test]
    fn prone_flag_follows_discrete_label_not_confidence() {
        let assessment = facade(1, [0.6, 0.4])
            .assess(&vector(), "poblacion", "mangaldan")
            .expect("assessment succeeds");
        assert!(assessment.is_accident_prone);
        assert_eq!(assessment.risk_level, RiskTier::Low);

        let assessment = facade(0, [0.2, 0.8])
            .assess(&vector(), "poblacion", "mangaldan")
            .expect("assessment succeeds");
        assert!(!assessment.is_accident_prone);
        assert_eq!(assessment.risk_level, RiskTier::High);
    }

    #[test]
    fn malformed_probability_output_is_an_error() {
        let facade = RiskClassifier::new(Arc::new(WideClassifier), statistics());
        let err = facade
            .assess(&vector(), "poblacion", "mangaldan")
            .expect_err("three-way output rejected");
        assert!(matches!(err, ClassifierError::UnexpectedOutput(3)));
    }

    #[test]
    fn empty_vector_batch_is_an_error() {
        let empty = FeatureVector::from_array(Array2::zeros((0, 4)));
        let err = facade(1, [0.1, 0.9])
            .assess(&empty, "poblacion", "mangaldan")
            .expect_err("no rows to score");
        assert!(matches!(err, ClassifierError::EmptyOutput));
    }
}
