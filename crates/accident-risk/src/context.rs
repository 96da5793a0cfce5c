use crate::artifacts::{ArtifactError, ModelMetadata, RiskArtifacts};
use crate::classifier::{Classifier, ClassifierError};
use crate::config::ArtifactPaths;
use crate::features::{FeatureEncoder, FeatureSchema, LocationQuery};
use crate::history::HistoricalStatistics;
use crate::risk::{RiskAssessment, RiskClassifier};
use std::sync::Arc;
use tracing::info;

/// Everything a request needs, assembled once before the server accepts
/// traffic and never mutated afterwards.
#[derive(Clone)]
pub struct RiskContext {
    encoder: FeatureEncoder,
    classifier: RiskClassifier,
    statistics: Arc<HistoricalStatistics>,
    metadata: ModelMetadata,
}

impl RiskContext {
    pub fn new(
        schema: FeatureSchema,
        model: Arc<dyn Classifier>,
        statistics: HistoricalStatistics,
        metadata: ModelMetadata,
    ) -> Self {
        let statistics = Arc::new(statistics);
        Self {
            encoder: FeatureEncoder::new(schema),
            classifier: RiskClassifier::new(model, statistics.clone()),
            statistics,
            metadata,
        }
    }

    pub fn from_artifacts(
        artifacts: RiskArtifacts,
        paths: &ArtifactPaths,
    ) -> Result<Self, ArtifactError> {
        let schema = artifacts.schema();
        let model = artifacts
            .model
            .build()
            .map_err(|source| ArtifactError::Model {
                path: paths.model.clone(),
                source,
            })?;

        Ok(Self::new(
            schema,
            Arc::from(model),
            artifacts.statistics,
            artifacts.metadata,
        ))
    }

    /// Load and assemble the full context from disk.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let artifacts = RiskArtifacts::load(paths)?;
        let context = Self::from_artifacts(artifacts, paths)?;

        info!(
            model_type = %context.metadata.model_type,
            accuracy = context.metadata.accuracy,
            features = context.encoder.schema().len(),
            training_samples = context.metadata.training_samples,
            locations = context.statistics.total_places(),
            scorer = context.classifier.model_kind(),
            "model and historical data loaded"
        );

        Ok(context)
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn statistics(&self) -> &HistoricalStatistics {
        &self.statistics
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn feature_count(&self) -> usize {
        self.encoder.schema().len()
    }

    /// Encode and score a query in one step.
    pub fn assess(&self, query: &LocationQuery<'_>) -> Result<RiskAssessment, ClassifierError> {
        let vector = self.encoder.encode(query);
        self.classifier.assess(&vector, query.place, query.area)
    }
}
