//! Random trader bot
//!
//! The trivial strategy from the bridge demos: a coin flip picks the side,
//! the amount is drawn uniformly from the configured range. Everything is
//! seeded so a run can be replayed.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use streamer::{AmountSampler, PacingConfig};
use types::ids::{InstrumentId, StrategyId};
use types::signal::{Side, TradingSignal};

/// Strategy id stamped on every generated signal.
pub const STRATEGY_ID: &str = "random_luck_v1";

/// Generates random BUY/SELL signals for one asset.
pub struct SignalBot {
    asset: InstrumentId,
    strategy_id: StrategyId,
    amounts: AmountSampler,
    rng: ChaCha8Rng,
}

impl SignalBot {
    pub fn new(asset: InstrumentId, pacing: &PacingConfig, seed: u64) -> Self {
        Self {
            asset,
            strategy_id: StrategyId::new(STRATEGY_ID),
            amounts: AmountSampler::from_config(pacing, seed),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next signal.
    pub fn next_signal(&mut self) -> TradingSignal {
        let action = if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        TradingSignal::new(
            action,
            self.asset.clone(),
            self.amounts.sample(),
            self.strategy_id.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(seed: u64) -> SignalBot {
        SignalBot::new(InstrumentId::new("TOK1"), &PacingConfig::default(), seed)
    }

    #[test]
    fn test_signals_are_valid() {
        let mut bot = bot(42);
        for _ in 0..200 {
            let signal = bot.next_signal();
            assert!(signal.validate().is_ok());
            assert_eq!(signal.strategy_id.as_str(), STRATEGY_ID);
        }
    }

    #[test]
    fn test_deterministic_per_seed() {
        let mut a = bot(7);
        let mut b = bot(7);
        for _ in 0..20 {
            assert_eq!(a.next_signal(), b.next_signal());
        }
    }

    #[test]
    fn test_both_sides_appear() {
        let mut bot = bot(42);
        let signals: Vec<_> = (0..100).map(|_| bot.next_signal()).collect();
        assert!(signals.iter().any(|s| s.action == Side::Buy));
        assert!(signals.iter().any(|s| s.action == Side::Sell));
    }
}
