//! Options-flow analysis: CSV parsing, feature engineering, and a
//! heuristic scenario forecast.

mod analyze;
mod error;
mod features;
mod forecast;
mod parser;
mod types;

pub use analyze::{AnalysisReport, DISCLAIMER, analyze_flow, build_key_levels, build_rationale};
pub use error::FlowError;
pub use features::compute_features;
pub use forecast::{Forecast, Scenario, build_forecast};
pub use parser::parse_csv_bytes;
pub use types::{EngineeredFeatures, FlowRow, FlowTable, KeyLevel, OptionType, Side, StrikePremium};
