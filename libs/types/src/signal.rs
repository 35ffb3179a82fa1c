//! Trading signal and execution result types
//!
//! Signals are buy/sell intents emitted by strategies; execution results are
//! the engine's reply, one per signal.

use crate::errors::SignalError;
use crate::ids::{ExecutionId, InstrumentId, StrategyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Signal side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy intent (fills against the ask)
    Buy,
    /// Sell intent (fills against the bid)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Label for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// A trading intent produced by a strategy.
///
/// `amount` must be strictly positive; `validate` enforces this after decode
/// so malformed signals are rejected before they reach the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSignal {
    /// BUY or SELL
    pub action: Side,
    /// Instrument the signal targets
    pub asset: InstrumentId,
    /// Quantity to trade, strictly positive
    pub amount: Decimal,
    /// Strategy that produced the signal
    pub strategy_id: StrategyId,
}

impl TradingSignal {
    pub fn new(
        action: Side,
        asset: InstrumentId,
        amount: Decimal,
        strategy_id: StrategyId,
    ) -> Self {
        Self {
            action,
            asset,
            amount,
            strategy_id,
        }
    }

    /// Check the signal invariants.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.amount <= Decimal::ZERO {
            return Err(SignalError::NonPositiveAmount {
                amount: self.amount.to_string(),
            });
        }
        Ok(())
    }
}

/// Outcome of executing one trading signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Unique id for this execution attempt
    pub execution_id: ExecutionId,
    /// Whether the signal filled
    pub success: bool,
    /// Fill price (zero on rejection)
    pub filled_price: Decimal,
    /// Fill amount (zero on rejection)
    pub filled_amount: Decimal,
    /// Fee charged on the fill
    pub fee: Decimal,
    /// Rejection reason, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    /// Execution timestamp in Unix nanoseconds
    pub timestamp: i64,
}

impl ExecutionResult {
    /// A successful fill.
    pub fn filled(price: Decimal, amount: Decimal, fee: Decimal, timestamp: i64) -> Self {
        Self {
            execution_id: ExecutionId::new(),
            success: true,
            filled_price: price,
            filled_amount: amount,
            fee,
            error_msg: None,
            timestamp,
        }
    }

    /// A rejection with a reason.
    pub fn rejected(reason: impl Into<String>, timestamp: i64) -> Self {
        Self {
            execution_id: ExecutionId::new(),
            success: false,
            filled_price: Decimal::ZERO,
            filled_amount: Decimal::ZERO,
            fee: Decimal::ZERO,
            error_msg: Some(reason.into()),
            timestamp,
        }
    }
}
