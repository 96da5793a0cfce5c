use crate::infra::artifact_paths;
use accident_risk::config::AppConfig;
use accident_risk::error::AppError;
use accident_risk::features::LocationQuery;
use accident_risk::history::title_case;
use accident_risk::risk::RiskAssessment;
use accident_risk::RiskContext;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Barangay (place) to score
    #[arg(long)]
    pub(crate) barangay: String,
    /// Municipality or police station the barangay belongs to
    #[arg(long, default_value = "unknown")]
    pub(crate) station: String,
    /// ISO-8601 timestamp to evaluate (defaults to now)
    #[arg(long)]
    pub(crate) timestamp: Option<String>,
    /// Vehicle category, e.g. "motorcycle"
    #[arg(long)]
    pub(crate) vehicle_type: Option<String>,
    /// Weather condition, e.g. "rainy"
    #[arg(long)]
    pub(crate) weather: Option<String>,
    /// Directory holding the model artifacts
    #[arg(long)]
    pub(crate) artifacts: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct InfoArgs {
    /// Directory holding the model artifacts
    #[arg(long)]
    pub(crate) artifacts: Option<PathBuf>,
}

fn load_context(dir_override: Option<PathBuf>) -> Result<RiskContext, AppError> {
    let config = AppConfig::load()?;
    let paths = artifact_paths(&config, dir_override);
    Ok(RiskContext::load(&paths)?)
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let barangay = args.barangay.trim().to_lowercase();
    if barangay.is_empty() {
        return Err(AppError::bad_request("Barangay name is required"));
    }
    let station = args.station.trim().to_lowercase();

    let context = load_context(args.artifacts)?;
    let query = LocationQuery::new(&barangay, &station)
        .with_timestamp(args.timestamp.as_deref())
        .with_vehicle_type(args.vehicle_type.as_deref())
        .with_weather(args.weather.as_deref());

    let vector = context.encoder().encode(&query);
    let assessment = context.classifier().assess(&vector, &barangay, &station)?;

    print!(
        "{}",
        render_assessment(
            &barangay,
            &station,
            &assessment,
            vector.count_nonzero(),
            vector.len()
        )
    );
    Ok(())
}

pub(crate) fn run_info(args: InfoArgs) -> Result<(), AppError> {
    let context = load_context(args.artifacts)?;
    let metadata = context.metadata();

    println!("Accident risk model");
    println!("  Type: {}", metadata.model_type);
    println!("  Accuracy: {:.2}%", metadata.accuracy * 100.0);
    println!("  Features: {}", context.feature_count());
    println!("  Training samples: {}", metadata.training_samples);
    println!("  Scorer: {}", context.classifier().model_kind());
    println!("\nHistorical data");
    println!("  Total locations: {}", context.statistics().total_places());
    println!(
        "  Municipalities: {}",
        context.statistics().municipalities().join(", ")
    );
    Ok(())
}

fn render_assessment(
    barangay: &str,
    station: &str,
    assessment: &RiskAssessment,
    active_features: usize,
    total_features: usize,
) -> String {
    let verdict = if assessment.is_accident_prone {
        "ACCIDENT-PRONE"
    } else {
        "SAFE"
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Location: {}, {}\n",
        title_case(barangay),
        title_case(station)
    ));
    out.push_str(&format!("Prediction: {verdict}\n"));
    out.push_str(&format!(
        "Confidence: {:.2}%\n",
        assessment.confidence * 100.0
    ));
    out.push_str(&format!("Risk level: {}\n", assessment.risk_level));
    out.push_str(&format!(
        "Historical incidents: {} ({} fatal), most common offense: {}\n",
        assessment.history.total_accidents,
        assessment.history.fatal_accidents,
        assessment.history.most_common_offense
    ));
    out.push_str(&format!(
        "Active features: {active_features} of {total_features}\n"
    ));
    out.push_str(&format!("{}\n", assessment.message));
    out
}
