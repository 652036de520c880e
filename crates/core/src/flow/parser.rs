//! CSV flow-table parsing.
//!
//! Providers export wildly different headers; parsing maps each logical
//! field to the first matching header candidate, cleans numeric text, and
//! drops rows missing a strike or option type.

use std::collections::HashMap;

use csv::ReaderBuilder;

use super::error::FlowError;
use super::types::{FlowRow, FlowTable, OptionType, Side};

/// Header candidates per logical field, in priority order.
const COLUMN_CANDIDATES: &[(&str, &[&str])] = &[
    ("symbol", &["symbol", "ticker", "underlying", "root", "stock"]),
    ("underlying", &["underlying", "root", "ticker"]),
    ("expiry", &["expiry", "expiration", "exp", "expiration_date", "exp_date"]),
    ("strike", &["strike", "strike_price", "strikeprice", "k"]),
    ("option_type", &["type", "call_put", "cp", "option_type"]),
    ("side", &["side", "bidask", "bid_ask", "aggressor", "at", "tick"]),
    ("price", &["price", "trade_price", "fill_price", "avg_price"]),
    ("size", &["size", "qty", "quantity", "volume", "contracts"]),
    ("premium", &["premium", "notional", "value", "amount"]),
    ("open_interest", &["oi", "open_interest"]),
    ("iv", &["iv", "implied_vol", "implied_volatility"]),
    ("delta", &["delta"]),
    ("timestamp", &["time", "timestamp", "ts", "date_time"]),
];

/// Maps logical field names to column indexes for this file's headers.
fn map_columns(headers: &csv::StringRecord) -> HashMap<&'static str, usize> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mut mapping = HashMap::new();
    for (field, candidates) in COLUMN_CANDIDATES {
        for candidate in *candidates {
            if let Some(idx) = lowered.iter().position(|h| h == candidate) {
                mapping.insert(*field, idx);
                break;
            }
        }
    }
    mapping
}

/// Cleans numeric text: strips commas, `$`, `%`; empty/nan/none become None.
fn to_float(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '$' | '%')).collect();
    cleaned.parse().ok()
}

fn normalize_side(raw: &str) -> Side {
    let s = raw.to_ascii_lowercase();
    if s.contains("ask") || s.contains("offer") {
        Side::Ask
    } else if s.contains("bid") {
        Side::Bid
    } else if s.contains("mid") || s.contains("between") {
        Side::Mid
    } else {
        Side::Unknown
    }
}

fn normalize_option_type(raw: &str) -> Option<OptionType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "c" | "call" | "calls" => Some(OptionType::Call),
        "p" | "put" | "puts" => Some(OptionType::Put),
        _ => None,
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    mapping: &HashMap<&'static str, usize>,
    name: &str,
) -> Option<&'a str> {
    mapping.get(name).and_then(|idx| record.get(*idx))
}

/// Parses CSV bytes into a normalized flow table.
///
/// Rows missing a strike or an option type are skipped rather than failing
/// the whole upload. Premium falls back to `price * size * 100` when the
/// feed does not report it.
///
/// # Errors
///
/// Returns `FlowError::Csv` when the bytes are not readable as CSV.
pub fn parse_csv_bytes(data: &[u8], provider: Option<&str>) -> Result<FlowTable, FlowError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(data);
    let mapping = map_columns(reader.headers()?);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        let Some(strike) = field(&record, &mapping, "strike").and_then(to_float) else {
            continue;
        };
        let Some(option_type) =
            field(&record, &mapping, "option_type").and_then(normalize_option_type)
        else {
            continue;
        };

        let symbol = field(&record, &mapping, "symbol").map(|s| s.trim().to_string());
        let underlying = field(&record, &mapping, "underlying").map(|s| s.trim().to_string());
        let price = field(&record, &mapping, "price").and_then(to_float);
        let size = field(&record, &mapping, "size").and_then(to_float);
        let mut premium = field(&record, &mapping, "premium").and_then(to_float);
        if premium.is_none()
            && let (Some(p), Some(n)) = (price, size)
        {
            premium = Some(p * n * 100.0);
        }

        rows.push(FlowRow {
            symbol: symbol
                .clone()
                .or_else(|| underlying.clone())
                .unwrap_or_default(),
            underlying: underlying.or(symbol),
            expiry: field(&record, &mapping, "expiry").map(|s| s.trim().to_string()),
            strike,
            option_type,
            side: field(&record, &mapping, "side").map_or(Side::Unknown, normalize_side),
            price,
            size,
            premium,
            open_interest: field(&record, &mapping, "open_interest").and_then(to_float),
            iv: field(&record, &mapping, "iv").and_then(to_float),
            delta: field(&record, &mapping, "delta").and_then(to_float),
            timestamp: field(&record, &mapping, "timestamp").map(|s| s.trim().to_string()),
        });
    }

    Ok(FlowTable {
        rows,
        provider: provider.map(ToString::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Ticker,Expiration,Strike,Type,Side,Price,Qty,Premium,IV,Delta
SPY,2024-09-20,500,CALL,At Ask,2.50,\"1,000\",\"$250,000\",0.18,0.45
SPY,2024-09-20,480,put,bid,1.10,500,,0.22,-0.30
SPY,2024-09-20,,call,ask,1.00,100,10000,,
QQQ,2024-10-18,400,straddle,mid,3.00,50,15000,,";

    #[test]
    fn test_header_candidate_mapping() {
        let table = parse_csv_bytes(SAMPLE.as_bytes(), Some("unusualwhales")).unwrap();
        // rows 3 and 4 are malformed (missing strike, unknown type)
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.provider.as_deref(), Some("unusualwhales"));

        let call = &table.rows[0];
        assert_eq!(call.symbol, "SPY");
        assert_eq!(call.option_type, OptionType::Call);
        assert_eq!(call.side, Side::Ask);
        assert!((call.strike - 500.0).abs() < f64::EPSILON);
        // "$250,000" cleaned
        assert!((call.premium.unwrap() - 250_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_premium_fallback_from_price_and_size() {
        let table = parse_csv_bytes(SAMPLE.as_bytes(), None).unwrap();
        let put = &table.rows[1];
        assert_eq!(put.option_type, OptionType::Put);
        assert_eq!(put.side, Side::Bid);
        // 1.10 * 500 * 100
        assert!((put.premium.unwrap() - 55_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_cleanup() {
        assert_eq!(to_float(" $1,234.5 "), Some(1234.5));
        assert_eq!(to_float("18%"), Some(18.0));
        assert_eq!(to_float("nan"), None);
        assert_eq!(to_float(""), None);
        assert_eq!(to_float("n/a"), None);
    }

    #[test]
    fn test_side_normalization() {
        assert_eq!(normalize_side("AT ASK"), Side::Ask);
        assert_eq!(normalize_side("offer side"), Side::Ask);
        assert_eq!(normalize_side("below bid"), Side::Bid);
        assert_eq!(normalize_side("between"), Side::Mid);
        assert_eq!(normalize_side("sweep"), Side::Unknown);
    }

    #[test]
    fn test_unreadable_bytes_still_yield_empty_table() {
        // csv is permissive; headerless binary junk parses to zero usable rows
        let table = parse_csv_bytes(&[0x00, 0x01, 0x02], None).unwrap();
        assert!(table.rows.is_empty());
    }
}
