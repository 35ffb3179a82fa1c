//! Last-known top-of-book cache
//!
//! Fed by an order book consumer, read by the execution engine to price
//! fills. A quote older than the staleness window is treated as dead — the
//! stream is lagging or the feed crashed — and signals against it are
//! rejected rather than filled at a zombie price.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;
use types::ids::InstrumentId;
use types::market::OrderBookUpdate;

/// Last observed quote for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    /// Unix nanoseconds of the snapshot that produced this quote.
    pub updated_at: i64,
}

impl Quote {
    /// Whether this quote is older than `window` at time `now` (nanos).
    pub fn is_stale(&self, now: i64, window: Duration) -> bool {
        now.saturating_sub(self.updated_at) > window.as_nanos() as i64
    }
}

/// Shared per-instrument quote map.
///
/// One writer (the book consumer) and any number of readers; the map is
/// small so a single mutex is enough.
#[derive(Default)]
pub struct PriceCache {
    quotes: Mutex<HashMap<InstrumentId, Quote>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one book snapshot into the cache.
    ///
    /// A side missing from the snapshot keeps its previous value — venues
    /// send one-sided updates when only one side of the book moved.
    pub fn apply(&self, update: &OrderBookUpdate) {
        let mut quotes = match self.quotes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let quote = quotes
            .entry(update.instrument.clone())
            .or_insert(Quote {
                best_bid: None,
                best_ask: None,
                updated_at: update.ts,
            });
        if update.best_bid.is_some() {
            quote.best_bid = update.best_bid;
        }
        if update.best_ask.is_some() {
            quote.best_ask = update.best_ask;
        }
        quote.updated_at = update.ts;
        debug!(
            instrument = %update.instrument,
            bid = ?quote.best_bid,
            ask = ?quote.best_ask,
            "quote updated"
        );
    }

    /// Last observed quote for an instrument, if it was ever streamed.
    pub fn quote(&self, instrument: &InstrumentId) -> Option<Quote> {
        let quotes = match self.quotes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        quotes.get(instrument).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn update(bid: Option<&str>, ask: Option<&str>, ts: i64) -> OrderBookUpdate {
        OrderBookUpdate {
            instrument: InstrumentId::new("TOK1"),
            best_bid: bid.map(dec),
            best_ask: ask.map(dec),
            ts,
        }
    }

    #[test]
    fn test_apply_and_read_back() {
        let cache = PriceCache::new();
        cache.apply(&update(Some("10.1"), Some("10.3"), 100));

        let quote = cache.quote(&InstrumentId::new("TOK1")).unwrap();
        assert_eq!(quote.best_bid, Some(dec("10.1")));
        assert_eq!(quote.best_ask, Some(dec("10.3")));
        assert_eq!(quote.updated_at, 100);
    }

    #[test]
    fn test_one_sided_update_keeps_other_side() {
        let cache = PriceCache::new();
        cache.apply(&update(Some("10.1"), Some("10.3"), 100));
        cache.apply(&update(Some("10.2"), None, 200));

        let quote = cache.quote(&InstrumentId::new("TOK1")).unwrap();
        assert_eq!(quote.best_bid, Some(dec("10.2")));
        assert_eq!(quote.best_ask, Some(dec("10.3")));
        assert_eq!(quote.updated_at, 200);
    }

    #[test]
    fn test_unknown_instrument() {
        let cache = PriceCache::new();
        assert!(cache.quote(&InstrumentId::new("MISSING")).is_none());
    }

    #[test]
    fn test_staleness_window() {
        let window = Duration::from_secs(60);
        let quote = Quote {
            best_bid: Some(dec("10.1")),
            best_ask: Some(dec("10.3")),
            updated_at: 0,
        };
        let just_inside = window.as_nanos() as i64;
        assert!(!quote.is_stale(just_inside, window));
        assert!(quote.is_stale(just_inside + 1, window));
    }
}
