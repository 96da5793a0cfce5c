use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-step risk label derived from prone-class confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Lower bounds, checked from the top; each bound belongs to its tier.
    const THRESHOLDS: [(f64, RiskTier); 3] = [
        (0.85, RiskTier::Critical),
        (0.70, RiskTier::High),
        (0.50, RiskTier::Medium),
    ];

    pub fn from_confidence(confidence: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(floor, _)| confidence >= *floor)
            .map_or(RiskTier::Low, |(_, tier)| *tier)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representative_confidences_map_to_each_tier() {
        let tiers: Vec<_> = [0.40, 0.55, 0.75, 0.90]
            .into_iter()
            .map(RiskTier::from_confidence)
            .collect();
        assert_eq!(
            tiers,
            vec![
                RiskTier::Low,
                RiskTier::Medium,
                RiskTier::High,
                RiskTier::Critical
            ]
        );
    }

    #[test]
    fn boundaries_belong_to_the_higher_tier() {
        assert_eq!(RiskTier::from_confidence(0.85), RiskTier::Critical);
        assert_eq!(RiskTier::from_confidence(0.70), RiskTier::High);
        assert_eq!(RiskTier::from_confidence(0.50), RiskTier::Medium);
        assert_eq!(RiskTier::from_confidence(0.4999), RiskTier::Low);
    }

    #[test]
    fn tier_is_monotonic_in_confidence() {
        let mut previous = RiskTier::Low;
        for step in 0..=100 {
            let tier = RiskTier::from_confidence(f64::from(step) / 100.0);
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn serializes_as_uppercase_label() {
        let json = serde_json::to_string(&RiskTier::Critical).expect("serializes");
        assert_eq!(json, "\"CRITICAL\"");
        assert_eq!(RiskTier::Medium.to_string(), "MEDIUM");
    }
}
