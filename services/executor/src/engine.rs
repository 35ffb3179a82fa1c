//! Signal execution engine
//!
//! Consumes trading signals from the inbound queue, prices each one against
//! the last-known top of book, settles the fill against the portfolio and
//! publishes the result to the outbound queue tagged with the originating
//! strategy.
//!
//! A buy fills at the best ask, a sell at the best bid. Signals against
//! instruments that were never streamed, whose quote has gone stale, or
//! whose fill side is unquoted are rejected, never guessed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use streamer::{
    ConsumerConfig, LogStore, StartPosition, StreamConsumer, StreamError, StreamProducer, Topic,
};
use types::signal::{ExecutionResult, Side, TradingSignal};

use crate::portfolio::Portfolio;
use crate::price_cache::PriceCache;

/// Configuration for the execution engine.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Quotes older than this reject incoming signals.
    pub staleness_window: Duration,
    /// Proportional fee charged on the cash leg of every fill.
    pub fee_rate: Decimal,
    /// Consumer retry backoff on store failures.
    pub retry_backoff: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            staleness_window: Duration::from_secs(60),
            fee_rate: Decimal::ZERO,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// Fill/rejection counters.
#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    fills: AtomicU64,
    rejections: AtomicU64,
}

impl ExecutorMetrics {
    pub fn fills(&self) -> u64 {
        self.fills.load(Ordering::Relaxed)
    }

    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }
}

/// The execution engine.
///
/// Cheap to clone; clones share the cache, portfolio and metrics.
#[derive(Clone)]
pub struct Executor {
    store: Arc<dyn LogStore>,
    producer: StreamProducer,
    cache: Arc<PriceCache>,
    portfolio: Arc<Portfolio>,
    config: ExecutorConfig,
    metrics: Arc<ExecutorMetrics>,
}

impl Executor {
    pub fn new(
        store: Arc<dyn LogStore>,
        cache: Arc<PriceCache>,
        portfolio: Arc<Portfolio>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            producer: StreamProducer::new(store.clone()),
            store,
            cache,
            portfolio,
            config,
            metrics: Arc::new(ExecutorMetrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<ExecutorMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Price and settle one signal at time `now` (Unix nanos).
    ///
    /// Pure decision logic: no waiting, no publishing. Used directly by
    /// tests and by the consumer loop in [`Executor::run`].
    pub fn execute(&self, signal: &TradingSignal, now: i64) -> ExecutionResult {
        if let Err(err) = signal.validate() {
            return self.reject(err.to_string(), now);
        }

        let quote = match self.cache.quote(&signal.asset) {
            Some(quote) => quote,
            None => return self.reject("Asset not streamed", now),
        };

        if quote.is_stale(now, self.config.staleness_window) {
            return self.reject("Stale price (stream lagging or dead)", now);
        }

        let fill_price = match signal.action {
            Side::Buy => quote.best_ask,
            Side::Sell => quote.best_bid,
        };
        let fill_price = match fill_price {
            Some(price) if price > Decimal::ZERO => price,
            _ => return self.reject("No liquidity", now),
        };

        let gross = fill_price * signal.amount;
        let fee = (gross * self.config.fee_rate).round_dp(8);

        let settled = match signal.action {
            Side::Buy => self
                .portfolio
                .settle_buy(&signal.asset, signal.amount, gross + fee),
            Side::Sell => self
                .portfolio
                .settle_sell(&signal.asset, signal.amount, gross - fee),
        };
        if let Err(err) = settled {
            return self.reject(err.to_string(), now);
        }

        self.metrics.fills.fetch_add(1, Ordering::Relaxed);
        ExecutionResult::filled(fill_price, signal.amount, fee, now)
    }

    /// Consume the inbound signal queue until cancelled.
    ///
    /// Each signal is executed and its result published to the outbound
    /// queue; a publish failure is logged and the loop continues — the
    /// settlement already happened and must not be replayed.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), StreamError> {
        let mut consumer = StreamConsumer::new(
            self.store.clone(),
            Topic::signals_inbound(),
            ConsumerConfig {
                name: "executor".to_string(),
                start: StartPosition::Tail,
                retry_backoff: self.config.retry_backoff,
            },
        );

        info!("executor started, listening on {}", Topic::signals_inbound());

        let this = self.clone();
        consumer
            .run(cancel, move |_, signal: TradingSignal| {
                let this = this.clone();
                async move {
                    let now = now_nanos();
                    let result = this.execute(&signal, now);
                    this.report(&signal, &result).await;
                }
            })
            .await
    }

    async fn report(&self, signal: &TradingSignal, result: &ExecutionResult) {
        if result.success {
            info!(
                action = signal.action.as_str(),
                asset = %signal.asset,
                price = %result.filled_price,
                amount = %result.filled_amount,
                "signal filled"
            );
        } else {
            warn!(
                action = signal.action.as_str(),
                asset = %signal.asset,
                reason = result.error_msg.as_deref().unwrap_or("unknown"),
                "signal rejected"
            );
        }

        let outcome = self
            .producer
            .publish_tagged(
                &Topic::signals_outbound(),
                &[("strategy_id", signal.strategy_id.as_str())],
                result,
            )
            .await;
        if let Err(err) = outcome {
            error!(error = %err, "failed to publish execution result");
        }
    }

    fn reject(&self, reason: impl Into<String>, now: i64) -> ExecutionResult {
        self.metrics.rejections.fetch_add(1, Ordering::Relaxed);
        ExecutionResult::rejected(reason, now)
    }
}

/// Current wall clock in Unix nanoseconds.
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
