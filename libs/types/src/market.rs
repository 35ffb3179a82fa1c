//! Order book snapshot types
//!
//! Top-of-book snapshots produced by a market data source and consumed by
//! listeners. Either side of the book may be absent (an empty side on the
//! venue); absence is an `Option`, never a sentinel value.

use crate::ids::InstrumentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-of-book snapshot for one instrument.
///
/// Transient: no persistence beyond the log's own retention. Prices are
/// decimals serialized as strings so `10.1` survives the wire exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookUpdate {
    /// Instrument this snapshot belongs to
    pub instrument: InstrumentId,
    /// Best bid price, absent when the bid side is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid: Option<Decimal>,
    /// Best ask price, absent when the ask side is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_ask: Option<Decimal>,
    /// Snapshot timestamp in Unix nanoseconds
    pub ts: i64,
}

impl OrderBookUpdate {
    /// Create a snapshot with both sides present.
    pub fn new(instrument: InstrumentId, best_bid: Decimal, best_ask: Decimal, ts: i64) -> Self {
        Self {
            instrument,
            best_bid: Some(best_bid),
            best_ask: Some(best_ask),
            ts,
        }
    }

    /// Whether both sides of the book are quoted.
    pub fn is_two_sided(&self) -> bool {
        self.best_bid.is_some() && self.best_ask.is_some()
    }

    /// Mid price, available only when both sides are quoted.
    pub fn mid(&self) -> Option<Decimal> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }
}

/// Render an optional price for console output, "N/A" when absent.
pub fn display_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) => p.to_string(),
        None => "N/A".to_string(),
    }
}
