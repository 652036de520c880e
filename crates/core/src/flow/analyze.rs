//! Flow analysis: features + forecast + key levels + rationale.

use serde::Serialize;

use super::features::{compute_features, premium_by_strike};
use super::forecast::{Forecast, build_forecast};
use super::types::{EngineeredFeatures, FlowTable, KeyLevel};

/// Educational disclaimer attached to every analysis response.
pub const DISCLAIMER: &str = "Educational use only. This report is not financial advice, \
     not a recommendation, and not an invitation to trade.";

/// How many key levels to surface.
const KEY_LEVELS: usize = 6;

/// Full analysis output for a flow table.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Engineered features.
    pub engineered_features: EngineeredFeatures,
    /// Scenario forecast.
    pub forecast: Forecast,
    /// Price levels the flow points at.
    pub key_levels: Vec<KeyLevel>,
    /// Feature summary used to justify the forecast.
    pub rationale: String,
    /// Heuristic confidence.
    pub confidence: f64,
}

/// Top strikes by total premium, annotated as key levels.
#[must_use]
pub fn build_key_levels(flow: &FlowTable) -> Vec<KeyLevel> {
    let mut ranked = premium_by_strike(&flow.rows);
    ranked.truncate(KEY_LEVELS);
    ranked
        .into_iter()
        .map(|s| KeyLevel {
            strike: s.strike,
            reason: format!("High premium concentration (~{:.0})", s.premium),
        })
        .collect()
}

/// Pipe-joined feature summary.
#[must_use]
pub fn build_rationale(features: &EngineeredFeatures) -> String {
    let mut parts = vec![
        format!("Net call premium: {:.0}", features.net_call_premium),
        format!("Net put premium: {:.0}", features.net_put_premium),
        format!("Call/Put ratio: {:.2}", features.call_put_ratio),
        format!("Aggressiveness (ask vs bid): {:.2}", features.aggressiveness),
    ];
    if let Some(skew) = features.skew_proxy {
        parts.push(format!("Skew proxy: {skew:.2}"));
    }
    parts.join(" | ")
}

/// Runs the full analysis pipeline over a parsed flow table.
#[must_use]
pub fn analyze_flow(flow: &FlowTable) -> AnalysisReport {
    let engineered_features = compute_features(flow);
    let forecast = build_forecast(&engineered_features);
    let key_levels = build_key_levels(flow);
    let rationale = build_rationale(&engineered_features);

    AnalysisReport {
        engineered_features,
        forecast,
        key_levels,
        rationale,
        confidence: 0.55,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowRow, OptionType, Side};

    fn row(strike: f64, premium: f64) -> FlowRow {
        FlowRow {
            symbol: "SPY".to_string(),
            underlying: Some("SPY".to_string()),
            expiry: None,
            strike,
            option_type: OptionType::Call,
            side: Side::Ask,
            price: None,
            size: None,
            premium: Some(premium),
            open_interest: None,
            iv: None,
            delta: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_key_levels_ranked_and_capped() {
        let rows: Vec<FlowRow> = (0..10)
            .map(|i| row(400.0 + f64::from(i), f64::from(i) * 1000.0))
            .collect();
        let flow = FlowTable {
            rows,
            provider: None,
        };

        let levels = build_key_levels(&flow);
        assert_eq!(levels.len(), 6);
        // highest premium first
        assert!((levels[0].strike - 409.0).abs() < f64::EPSILON);
        assert!(levels[0].reason.contains("9000"));
    }

    #[test]
    fn test_rationale_mentions_core_features() {
        let flow = FlowTable {
            rows: vec![row(500.0, 100_000.0)],
            provider: None,
        };
        let report = analyze_flow(&flow);
        assert!(report.rationale.contains("Net call premium"));
        assert!(report.rationale.contains("Call/Put ratio"));
        // no IV data, no skew line
        assert!(!report.rationale.contains("Skew proxy"));
    }

    #[test]
    fn test_report_shape() {
        let flow = FlowTable {
            rows: vec![row(500.0, 250_000.0)],
            provider: None,
        };
        let report = analyze_flow(&flow);
        assert_eq!(report.forecast.scenarios.len(), 3);
        assert!((report.confidence - 0.55).abs() < f64::EPSILON);
        assert_eq!(report.key_levels.len(), 1);
    }
}
