use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Yes,
    #[default]
    No,
}

impl Prediction {
    /// Lenient mapping from model output. Anything that is not "yes" maps to NO.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("yes") {
            Prediction::Yes
        } else {
            Prediction::No
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Yes => "yes",
            Prediction::No => "no",
        }
    }
}

/// Strength of a trading signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Lenient mapping from model output. Unknown labels map to LOW.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("high") {
            Confidence::High
        } else if label.eq_ignore_ascii_case("medium") {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// A structured trading recommendation for one market.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub market_id: String,
    pub market_title: String,
    pub prediction: Prediction,
    pub confidence: Confidence,
    pub rationale: String,
    /// Always sourced from the input market, never from model output.
    pub current_price: Option<f64>,
}

/// Final output of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOutput {
    pub signals: Vec<Signal>,
    pub overall_analysis: String,
    pub generated_at: DateTime<Utc>,
}
