//! Heuristic scenario forecast from engineered features.

use serde::Serialize;

use super::types::EngineeredFeatures;

/// A forecast scenario.
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    /// Scenario name: bull, bear, or neutral.
    pub name: &'static str,
    /// Probability after renormalization.
    pub probability: f64,
    /// Human-readable description.
    pub description: &'static str,
}

/// Scenario probabilities for a flow table.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    /// Bull/bear/neutral scenarios; probabilities sum to 1.
    pub scenarios: Vec<Scenario>,
}

/// Premium scale for the tanh squash: a million of net premium is "a lot".
const PREMIUM_SCALE: f64 = 1_000_000.0;

/// Builds the heuristic forecast.
///
/// Score: `tanh(net_call/1e6)*0.8 - tanh(net_put/1e6)*0.8 +
/// aggressiveness*0.5`; bull is the logistic of the score, bear its
/// complement, neutral a fixed 0.15 floor, all renormalized.
#[must_use]
pub fn build_forecast(features: &EngineeredFeatures) -> Forecast {
    let mut score = 0.0;
    score += (features.net_call_premium / PREMIUM_SCALE).tanh() * 0.8;
    score -= (features.net_put_premium / PREMIUM_SCALE).tanh() * 0.8;
    score += features.aggressiveness * 0.5;

    let bull = 1.0 / (1.0 + (-score).exp());
    let bear = 1.0 - bull;
    let neutral = 0.15;

    let total = bull + bear + neutral;
    Forecast {
        scenarios: vec![
            Scenario {
                name: "bull",
                probability: bull / total,
                description: "Upside continuation if flows are confirmed",
            },
            Scenario {
                name: "bear",
                probability: bear / total,
                description: "Downside scenario if puts dominate",
            },
            Scenario {
                name: "neutral",
                probability: neutral / total,
                description: "Range/mean-reversion if flow is mixed",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(net_call: f64, net_put: f64, aggressiveness: f64) -> EngineeredFeatures {
        EngineeredFeatures {
            net_call_premium: net_call,
            net_put_premium: net_put,
            call_put_ratio: 1.0,
            aggressiveness,
            top_strikes_by_premium: vec![],
            concentration_hhi: 0.0,
            delta_notional: None,
            skew_proxy: None,
        }
    }

    fn probability(forecast: &Forecast, name: &str) -> f64 {
        forecast
            .scenarios
            .iter()
            .find(|s| s.name == name)
            .unwrap()
            .probability
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let forecast = build_forecast(&features(2_000_000.0, -500_000.0, 0.4));
        let sum: f64 = forecast.scenarios.iter().map(|s| s.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_call_heavy_flow_is_bullish() {
        let forecast = build_forecast(&features(3_000_000.0, 0.0, 0.5));
        assert!(probability(&forecast, "bull") > probability(&forecast, "bear"));
    }

    #[test]
    fn test_put_heavy_flow_is_bearish() {
        let forecast = build_forecast(&features(0.0, 3_000_000.0, -0.5));
        assert!(probability(&forecast, "bear") > probability(&forecast, "bull"));
    }

    #[test]
    fn test_flat_flow_is_balanced() {
        let forecast = build_forecast(&features(0.0, 0.0, 0.0));
        let bull = probability(&forecast, "bull");
        let bear = probability(&forecast, "bear");
        assert!((bull - bear).abs() < 1e-9);
    }
}
