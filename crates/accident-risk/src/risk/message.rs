use crate::history::HistoricalRecord;

/// Confidence rendered as a whole percentage, e.g. `0.873` -> `87%`.
///
/// The scaled float is what gets rounded, so `0.355` reads as `36%`.
pub(crate) fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

pub(crate) fn compose(place: &str, prone: bool, confidence: f64, history: &HistoricalRecord) -> String {
    let place = place.to_uppercase();
    let confidence = percent(confidence);

    if prone {
        let mut message = format!("ML MODEL ALERT: {place} has {confidence} predicted accident risk!");
        if history.total_accidents > 0 {
            message.push_str(&format!(
                " Historical data shows {} recorded incidents",
                history.total_accidents
            ));
            if history.fatal_accidents > 0 {
                message.push_str(&format!(" ({} fatal)", history.fatal_accidents));
            }
            message.push('.');
        }
        message
    } else {
        let mut message = format!("{place} appears safe - {confidence} confidence in low risk.");
        if history.total_accidents > 0 {
            message.push_str(&format!(
                " (Note: {} historical incidents recorded)",
                history.total_accidents
            ));
        }
        message
    }
}
