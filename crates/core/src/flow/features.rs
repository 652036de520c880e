//! Feature engineering over a parsed flow table.

use std::collections::HashMap;

use super::types::{EngineeredFeatures, FlowRow, FlowTable, OptionType, Side, StrikePremium};

/// How many strikes to keep in the ranked premium list.
const TOP_STRIKES: usize = 8;

/// Premium signed by aggressor side: ask positive, bid negative, else zero.
fn premium_signed(row: &FlowRow) -> f64 {
    let premium = row.premium.unwrap_or(0.0);
    match row.side {
        Side::Ask => premium,
        Side::Bid => -premium,
        Side::Mid | Side::Unknown => 0.0,
    }
}

/// Total premium per strike, ranked descending.
pub(super) fn premium_by_strike(rows: &[FlowRow]) -> Vec<StrikePremium> {
    let mut by_strike: HashMap<u64, (f64, f64)> = HashMap::new();
    for row in rows {
        let premium = row.premium.unwrap_or(0.0);
        // f64 keys are not hashable; strikes are quotes with finite precision
        let key = row.strike.to_bits();
        let entry = by_strike.entry(key).or_insert((row.strike, 0.0));
        entry.1 += premium;
    }

    let mut ranked: Vec<StrikePremium> = by_strike
        .into_values()
        .map(|(strike, premium)| StrikePremium { strike, premium })
        .collect();
    ranked.sort_by(|a, b| b.premium.total_cmp(&a.premium));
    ranked
}

/// Computes engineered features for a flow table.
#[must_use]
pub fn compute_features(flow: &FlowTable) -> EngineeredFeatures {
    let rows = &flow.rows;
    let calls: Vec<&FlowRow> = rows
        .iter()
        .filter(|r| r.option_type == OptionType::Call)
        .collect();
    let puts: Vec<&FlowRow> = rows
        .iter()
        .filter(|r| r.option_type == OptionType::Put)
        .collect();

    let net_call_premium: f64 = calls.iter().map(|r| premium_signed(r)).sum();
    let net_put_premium: f64 = puts.iter().map(|r| premium_signed(r)).sum();

    let total_call_prem: f64 = calls.iter().filter_map(|r| r.premium).sum();
    let total_put_prem: f64 = puts.iter().filter_map(|r| r.premium).sum();
    let call_put_ratio = if total_put_prem > 0.0 {
        total_call_prem / total_put_prem
    } else {
        0.0
    };

    let ask_prem: f64 = rows
        .iter()
        .filter(|r| r.side == Side::Ask)
        .filter_map(|r| r.premium)
        .sum();
    let bid_prem: f64 = rows
        .iter()
        .filter(|r| r.side == Side::Bid)
        .filter_map(|r| r.premium)
        .sum();
    let aggressiveness = (ask_prem - bid_prem) / (ask_prem + bid_prem).max(1e-6);

    let mut ranked = premium_by_strike(rows);
    let total_premium: f64 = ranked.iter().map(|s| s.premium).sum();
    let concentration_hhi = if total_premium > 0.0 {
        ranked
            .iter()
            .map(|s| {
                let share = s.premium / total_premium;
                share * share
            })
            .sum()
    } else {
        0.0
    };
    ranked.truncate(TOP_STRIKES);

    let mut delta_notional = 0.0;
    let mut has_delta = false;
    let mut iv_calls = Vec::new();
    let mut iv_puts = Vec::new();
    for row in rows {
        if let (Some(delta), Some(premium)) = (row.delta, row.premium) {
            has_delta = true;
            delta_notional += delta * premium;
        }
        if let Some(iv) = row.iv {
            match row.option_type {
                OptionType::Call => iv_calls.push(iv),
                OptionType::Put => iv_puts.push(iv),
            }
        }
    }

    let skew_proxy = (!iv_calls.is_empty() && !iv_puts.is_empty()).then(|| {
        let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
        mean(&iv_puts) - mean(&iv_calls)
    });

    EngineeredFeatures {
        net_call_premium,
        net_put_premium,
        call_put_ratio,
        aggressiveness,
        top_strikes_by_premium: ranked,
        concentration_hhi,
        delta_notional: has_delta.then_some(delta_notional),
        skew_proxy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        option_type: OptionType,
        side: Side,
        strike: f64,
        premium: f64,
        iv: Option<f64>,
        delta: Option<f64>,
    ) -> FlowRow {
        FlowRow {
            symbol: "SPY".to_string(),
            underlying: Some("SPY".to_string()),
            expiry: None,
            strike,
            option_type,
            side,
            price: None,
            size: None,
            premium: Some(premium),
            open_interest: None,
            iv,
            delta,
            timestamp: None,
        }
    }

    fn table(rows: Vec<FlowRow>) -> FlowTable {
        FlowTable {
            rows,
            provider: None,
        }
    }

    #[test]
    fn test_net_premium_signed_by_side() {
        let flow = table(vec![
            row(OptionType::Call, Side::Ask, 500.0, 100_000.0, None, None),
            row(OptionType::Call, Side::Bid, 500.0, 30_000.0, None, None),
            row(OptionType::Put, Side::Bid, 480.0, 20_000.0, None, None),
            row(OptionType::Put, Side::Mid, 480.0, 999_999.0, None, None),
        ]);
        let features = compute_features(&flow);
        assert!((features.net_call_premium - 70_000.0).abs() < 1e-9);
        assert!((features.net_put_premium - -20_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_call_put_ratio_zero_without_puts() {
        let flow = table(vec![row(
            OptionType::Call,
            Side::Ask,
            500.0,
            1000.0,
            None,
            None,
        )]);
        assert!(compute_features(&flow).call_put_ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn test_aggressiveness_range() {
        let flow = table(vec![
            row(OptionType::Call, Side::Ask, 500.0, 80_000.0, None, None),
            row(OptionType::Put, Side::Bid, 480.0, 20_000.0, None, None),
        ]);
        let features = compute_features(&flow);
        // (80k - 20k) / 100k
        assert!((features.aggressiveness - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_hhi_concentration() {
        // everything at one strike -> HHI = 1
        let flow = table(vec![
            row(OptionType::Call, Side::Ask, 500.0, 10_000.0, None, None),
            row(OptionType::Call, Side::Ask, 500.0, 10_000.0, None, None),
        ]);
        let features = compute_features(&flow);
        assert!((features.concentration_hhi - 1.0).abs() < 1e-9);
        assert_eq!(features.top_strikes_by_premium.len(), 1);
    }

    #[test]
    fn test_skew_and_delta_optional() {
        let no_iv = table(vec![row(
            OptionType::Call,
            Side::Ask,
            500.0,
            1000.0,
            None,
            None,
        )]);
        let features = compute_features(&no_iv);
        assert!(features.skew_proxy.is_none());
        assert!(features.delta_notional.is_none());

        let with_both = table(vec![
            row(OptionType::Call, Side::Ask, 500.0, 1000.0, Some(0.20), Some(0.5)),
            row(OptionType::Put, Side::Bid, 480.0, 1000.0, Some(0.30), None),
        ]);
        let features = compute_features(&with_both);
        assert!((features.skew_proxy.unwrap() - 0.10).abs() < 1e-9);
        assert!((features.delta_notional.unwrap() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table() {
        let features = compute_features(&table(vec![]));
        assert!(features.net_call_premium.abs() < f64::EPSILON);
        assert!(features.concentration_hhi.abs() < f64::EPSILON);
        assert!(features.top_strikes_by_premium.is_empty());
    }
}
