use crate::classifier::{ClassifierError, ModelSpec};
use crate::config::ArtifactPaths;
use crate::features::FeatureSchema;
use crate::history::HistoricalStatistics;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Summary written by the training pipeline next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub accuracy: f64,
    #[serde(default)]
    pub training_samples: u64,
}

/// Raw, parsed-but-unassembled training outputs.
#[derive(Debug, Clone)]
pub struct RiskArtifacts {
    pub model: ModelSpec,
    pub feature_names: Vec<String>,
    pub statistics: HistoricalStatistics,
    pub metadata: ModelMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model in {} is unusable: {source}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ClassifierError,
    },
    #[error("feature list in {} is empty", path.display())]
    EmptySchema { path: PathBuf },
}

impl RiskArtifacts {
    /// Read every artifact; any missing or malformed file is an error.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let model = read_json(&paths.model)?;
        let feature_names: Vec<String> = read_json(&paths.features)?;
        if feature_names.is_empty() {
            return Err(ArtifactError::EmptySchema {
                path: paths.features.clone(),
            });
        }
        let statistics = read_json(&paths.statistics)?;
        let metadata = read_json(&paths.metadata)?;

        Ok(Self {
            model,
            feature_names,
            statistics,
            metadata,
        })
    }

    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.feature_names.clone())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_set(dir: &Path, features: &str) -> ArtifactPaths {
        let paths = ArtifactPaths::in_dir(dir);
        fs::write(
            &paths.model,
            r#"{"kind": "logistic_regression", "classes": [0, 1], "coefficients": [0.1, 0.2], "intercept": 0.0}"#,
        )
        .expect("write model");
        fs::write(&paths.features, features).expect("write features");
        fs::write(
            &paths.statistics,
            r#"{"total_places": 0, "statistics": {}}"#,
        )
        .expect("write statistics");
        fs::write(
            &paths.metadata,
            r#"{"model_type": "LogisticRegression", "accuracy": 0.81, "training_samples": 640}"#,
        )
        .expect("write metadata");
        paths
    }

    #[test]
    fn loads_a_complete_artifact_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_set(dir.path(), r#"["month", "hour"]"#);

        let artifacts = RiskArtifacts::load(&paths).expect("artifacts load");
        assert_eq!(artifacts.schema().len(), 2);
        assert_eq!(artifacts.metadata.training_samples, 640);
        assert!(artifacts.statistics.is_empty());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_set(dir.path(), r#"["month"]"#);
        fs::remove_file(&paths.metadata).expect("remove metadata");

        let err = RiskArtifacts::load(&paths).expect_err("metadata missing");
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("model_metadata.json"));
    }

    #[test]
    fn corrupt_json_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_set(dir.path(), r#"["month", "#);

        let err = RiskArtifacts::load(&paths).expect_err("features corrupt");
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn empty_feature_list_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_set(dir.path(), "[]");

        let err = RiskArtifacts::load(&paths).expect_err("schema empty");
        assert!(matches!(err, ArtifactError::EmptySchema { .. }));
    }
}
