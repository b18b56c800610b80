pub mod config;
pub mod market;
pub mod signal;

pub use config::{AuspexConfig, CallShape, ClientConfig, PipelineConfig};
pub use market::{AnalysisInput, MainEvent, Market, ResearchContext, Sentiment};
pub use signal::{AnalysisOutput, Confidence, Prediction, Signal};
