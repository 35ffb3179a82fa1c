//! In-memory portfolio
//!
//! Tracks the cash balance and per-asset holdings the executor settles
//! against. Each settlement is validated and applied under one lock so a
//! fill can never leave the book half-updated.

use std::collections::HashMap;
use std::sync::Mutex;

use rust_decimal::Decimal;
use types::errors::BalanceError;
use types::ids::InstrumentId;

/// Ledger key for the cash leg of every trade.
pub const CASH_ASSET: &str = "USD";

/// Balances keyed by asset, cash included under [`CASH_ASSET`].
pub struct Portfolio {
    balances: Mutex<HashMap<String, Decimal>>,
}

impl Portfolio {
    /// Empty portfolio; every buy will be rejected until cash is funded.
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Portfolio funded with an opening cash balance.
    pub fn with_cash(cash: Decimal) -> Self {
        let portfolio = Self::new();
        portfolio.credit(CASH_ASSET, cash);
        portfolio
    }

    /// Add to an asset balance.
    pub fn credit(&self, asset: &str, amount: Decimal) {
        let mut balances = self.lock();
        *balances.entry(asset.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    /// Current balance for an asset, zero when never touched.
    pub fn balance(&self, asset: &str) -> Decimal {
        self.lock().get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Settle a buy: cash down by `cost`, asset up by `amount`.
    ///
    /// Validates and applies atomically; an insufficient cash balance
    /// changes nothing.
    pub fn settle_buy(
        &self,
        asset: &InstrumentId,
        amount: Decimal,
        cost: Decimal,
    ) -> Result<(), BalanceError> {
        let mut balances = self.lock();
        let cash = balances.get(CASH_ASSET).copied().unwrap_or(Decimal::ZERO);
        if cash < cost {
            return Err(BalanceError::InsufficientBalance {
                asset: CASH_ASSET.to_string(),
                required: cost.to_string(),
                available: cash.to_string(),
            });
        }
        *balances.entry(CASH_ASSET.to_string()).or_insert(Decimal::ZERO) -= cost;
        *balances.entry(asset.as_str().to_string()).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    /// Settle a sell: asset down by `amount`, cash up by `proceeds`.
    pub fn settle_sell(
        &self,
        asset: &InstrumentId,
        amount: Decimal,
        proceeds: Decimal,
    ) -> Result<(), BalanceError> {
        let mut balances = self.lock();
        let held = balances.get(asset.as_str()).copied().unwrap_or(Decimal::ZERO);
        if held < amount {
            return Err(BalanceError::InsufficientBalance {
                asset: asset.as_str().to_string(),
                required: amount.to_string(),
                available: held.to_string(),
            });
        }
        *balances.entry(asset.as_str().to_string()).or_insert(Decimal::ZERO) -= amount;
        *balances.entry(CASH_ASSET.to_string()).or_insert(Decimal::ZERO) += proceeds;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Decimal>> {
        match self.balances.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new()
    }
}
