//! Flow-table domain types.

use serde::{Deserialize, Serialize};

/// Option contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    /// Call contract.
    #[serde(rename = "C")]
    Call,
    /// Put contract.
    #[serde(rename = "P")]
    Put,
}

/// Which side of the market a print hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Traded at or near the ask (aggressive buyer).
    Ask,
    /// Traded at or near the bid (aggressive seller).
    Bid,
    /// Traded between the spread.
    Mid,
    /// Side could not be determined.
    Unknown,
}

/// A single normalized options-flow print.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRow {
    /// Contract symbol (or underlying when that is all the feed gives).
    pub symbol: String,
    /// Underlying ticker.
    pub underlying: Option<String>,
    /// Expiry as `YYYY-MM-DD` where present.
    pub expiry: Option<String>,
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Aggressor side.
    pub side: Side,
    /// Trade price per contract.
    pub price: Option<f64>,
    /// Contract count.
    pub size: Option<f64>,
    /// Premium (notional). Derived from `price * size * 100` when absent.
    pub premium: Option<f64>,
    /// Open interest.
    pub open_interest: Option<f64>,
    /// Implied volatility.
    pub iv: Option<f64>,
    /// Delta.
    pub delta: Option<f64>,
    /// Raw feed timestamp.
    pub timestamp: Option<String>,
}

/// A parsed flow upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowTable {
    /// Normalized rows; malformed input rows are dropped during parsing.
    pub rows: Vec<FlowRow>,
    /// Feed provider hint supplied at ingest time.
    pub provider: Option<String>,
}

/// Premium concentrated at a strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikePremium {
    /// Strike price.
    pub strike: f64,
    /// Total premium at the strike.
    pub premium: f64,
}

/// Engineered features for a flow table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    /// Ask-side minus bid-side call premium.
    pub net_call_premium: f64,
    /// Ask-side minus bid-side put premium.
    pub net_put_premium: f64,
    /// Total call premium over total put premium (0 when no puts).
    pub call_put_ratio: f64,
    /// `(ask - bid) / max(ask + bid, epsilon)` across all rows.
    pub aggressiveness: f64,
    /// Top strikes ranked by total premium.
    pub top_strikes_by_premium: Vec<StrikePremium>,
    /// Herfindahl index of premium concentration across strikes.
    pub concentration_hhi: f64,
    /// Sum of `delta * premium` where both are present.
    pub delta_notional: Option<f64>,
    /// Mean put IV minus mean call IV, when both sides have IV data.
    pub skew_proxy: Option<f64>,
}

/// A price level the flow points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyLevel {
    /// Strike price.
    pub strike: f64,
    /// Why the level matters.
    pub reason: String,
}
