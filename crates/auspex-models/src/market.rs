use std::fmt;

use serde::{Deserialize, Serialize};

/// A single prediction market to be analyzed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Market {
    pub id: String,
    pub title: String,
    /// Current YES probability in [0, 1], if the venue quotes one.
    pub current_price: Option<f64>,
}

/// The umbrella event the markets belong to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MainEvent {
    pub title: String,
    pub description: Option<String>,
}

/// Aggregate sentiment from the upstream research pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    #[default]
    Neutral,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-gathered research context shared by every batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchContext {
    pub main_event: MainEvent,
    pub research_summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
}

/// Top-level input to the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisInput {
    pub research: ResearchContext,
    pub markets: Vec<Market>,
}
