use accident_risk::config::{AppConfig, ArtifactPaths};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// A `--artifacts` directory replaces every configured artifact path.
pub(crate) fn artifact_paths(config: &AppConfig, dir_override: Option<PathBuf>) -> ArtifactPaths {
    match dir_override {
        Some(dir) => ArtifactPaths::in_dir(dir),
        None => config.artifacts.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accident_risk::config::{AppEnvironment, ServerConfig, TelemetryConfig};

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            artifacts: ArtifactPaths::in_dir("artifacts"),
        }
    }

    #[test]
    fn override_directory_wins() {
        let paths = artifact_paths(&config(), Some(PathBuf::from("/srv/models")));
        assert_eq!(paths, ArtifactPaths::in_dir("/srv/models"));
    }

    #[test]
    fn configured_paths_are_used_by_default() {
        assert_eq!(artifact_paths(&config(), None), config().artifacts);
    }
}
