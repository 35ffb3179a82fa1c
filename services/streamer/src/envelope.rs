//! Envelope codec
//!
//! A record carries its domain payload JSON-serialized inside a single
//! well-known field. The field name is shared between producer and consumer
//! through [`DATA_FIELD`] so the two sides cannot drift.
//!
//! Decoding is total over missing optional payload keys: an absent
//! `best_bid` becomes `None`, never an error. Only a missing envelope field
//! or unparseable JSON fails.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DecodeError, EncodeError};
use crate::store::Record;

/// The record field holding the serialized domain payload.
pub const DATA_FIELD: &str = "data";

/// Serialize a payload into the envelope field value.
pub fn encode<T: Serialize>(payload: &T) -> Result<String, EncodeError> {
    serde_json::to_string(payload).map_err(|err| EncodeError::Serialization {
        reason: err.to_string(),
    })
}

/// Build the single-field mapping a published record carries.
pub fn fields_for<T: Serialize>(payload: &T) -> Result<BTreeMap<String, String>, EncodeError> {
    let mut fields = BTreeMap::new();
    fields.insert(DATA_FIELD.to_string(), encode(payload)?);
    Ok(fields)
}

/// Decode the payload out of a record's envelope field.
pub fn decode<T: DeserializeOwned>(record: &Record) -> Result<T, DecodeError> {
    let raw = record
        .fields
        .get(DATA_FIELD)
        .ok_or(DecodeError::MissingData { field: DATA_FIELD })?;
    serde_json::from_str(raw).map_err(|err| DecodeError::Malformed {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordId;
    use rust_decimal::Decimal;
    use types::ids::{InstrumentId, StrategyId};
    use types::market::OrderBookUpdate;
    use types::signal::{Side, TradingSignal};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn record_with(fields: BTreeMap<String, String>) -> Record {
        Record::new(RecordId::new(1), fields)
    }

    #[test]
    fn test_roundtrip_signal() {
        let signal = TradingSignal::new(
            Side::Buy,
            InstrumentId::new("TOK1"),
            dec("2.50"),
            StrategyId::new("random_luck_v1"),
        );
        let record = record_with(fields_for(&signal).unwrap());
        let back: TradingSignal = decode(&record).unwrap();
        assert_eq!(back, signal);
    }

    #[test]
    fn test_roundtrip_orderbook_with_missing_ask() {
        let update = OrderBookUpdate {
            instrument: InstrumentId::new("TOK1"),
            best_bid: Some(dec("10.1")),
            best_ask: None,
            ts: 7,
        };
        let record = record_with(fields_for(&update).unwrap());
        let back: OrderBookUpdate = decode(&record).unwrap();
        assert_eq!(back.best_bid, Some(dec("10.1")));
        assert_eq!(back.best_ask, None);
    }

    #[test]
    fn test_missing_data_field() {
        let record = record_with(BTreeMap::new());
        let err = decode::<TradingSignal>(&record).unwrap_err();
        assert_eq!(err, DecodeError::MissingData { field: DATA_FIELD });
    }

    #[test]
    fn test_malformed_json() {
        let mut fields = BTreeMap::new();
        fields.insert(DATA_FIELD.to_string(), "not json".to_string());
        let err = decode::<TradingSignal>(&record_with(fields)).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_missing_required_key_is_malformed() {
        let mut fields = BTreeMap::new();
        fields.insert(DATA_FIELD.to_string(), "{\"action\":\"BUY\"}".to_string());
        let err = decode::<TradingSignal>(&record_with(fields)).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn amount_strategy() -> impl Strategy<Value = Decimal> {
            // Positive decimals with up to 4 dp, the range the trader emits.
            (1i64..=5_000_000, 0u32..=4).prop_map(|(mantissa, scale)| {
                Decimal::new(mantissa, scale)
            })
        }

        proptest! {
            #[test]
            fn roundtrip_law_signals(
                buy in any::<bool>(),
                asset in "[A-Z0-9]{1,12}",
                amount in amount_strategy(),
                strategy in "[a-z_]{1,16}",
            ) {
                let signal = TradingSignal::new(
                    if buy { Side::Buy } else { Side::Sell },
                    InstrumentId::new(asset),
                    amount,
                    StrategyId::new(strategy),
                );
                let record = record_with(fields_for(&signal).unwrap());
                let back: TradingSignal = decode(&record).unwrap();
                prop_assert_eq!(back, signal);
            }

            #[test]
            fn roundtrip_law_orderbook(
                bid in proptest::option::of(amount_strategy()),
                ask in proptest::option::of(amount_strategy()),
                ts in 0i64..=i64::MAX / 2,
            ) {
                let update = OrderBookUpdate {
                    instrument: InstrumentId::new("TOK1"),
                    best_bid: bid,
                    best_ask: ask,
                    ts,
                };
                let record = record_with(fields_for(&update).unwrap());
                let back: OrderBookUpdate = decode(&record).unwrap();
                prop_assert_eq!(back, update);
            }
        }
    }
}
