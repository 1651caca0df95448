use serde::{Deserialize, Serialize};

/// Ordinal severity band over a risk percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 30.0 {
            RiskBand::Low
        } else if percent < 60.0 {
            RiskBand::Medium
        } else if percent < 80.0 {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Medium => "Medium Risk",
            RiskBand::High => "High Risk",
            RiskBand::Critical => "Critical Risk",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sprint-over-sprint direction of predicted risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTrend {
    NoData,
    Increasing,
    Improving,
    Stable,
}

impl RiskTrend {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTrend::NoData => "No Trend Data",
            RiskTrend::Increasing => "Risk Increasing (Early Warning)",
            RiskTrend::Improving => "Risk Improving",
            RiskTrend::Stable => "Risk Stable",
        }
    }
}

pub const DEFAULT_TREND_THRESHOLD: f64 = 10.0;

/// Compare the last two risk percentages. Returns the trend and the change.
pub fn risk_direction(risks: &[f64], threshold: f64) -> (RiskTrend, f64) {
    let [.., previous, last] = risks else {
        return (RiskTrend::NoData, 0.0);
    };
    let change = last - previous;
    let trend = if change > threshold {
        RiskTrend::Increasing
    } else if change < -threshold {
        RiskTrend::Improving
    } else {
        RiskTrend::Stable
    };
    (trend, change)
}

/// Probability in [0,1] to a percentage rounded to one decimal place
pub fn to_percent(probability: f64) -> f64 {
    round1(probability * 100.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
