//! Random trader
//!
//! Places random BUY/SELL signals for one asset on the inbound queue and
//! runs the execution engine against them: signals fill at the synthetic
//! book's touch and results land on the outbound queue.

use std::sync::Arc;

use clap::Parser;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use clients::{FeedConfig, SignalBot, SyntheticFeed};
use executor::{Executor, ExecutorConfig, Portfolio, PriceCache};
use streamer::{
    ConsumerConfig, DelayPolicy, MemoryLogStore, PacingConfig, StartPosition, StreamConsumer,
    StreamProducer, Topic, UniformDelay,
};
use types::ids::InstrumentId;
use types::market::OrderBookUpdate;

/// Place random signals for one asset and execute them.
#[derive(Parser)]
#[command(name = "random-trader")]
struct Args {
    /// Asset identifier to trade
    asset: String,

    /// Opening cash balance
    #[arg(long, default_value = "1000")]
    cash: Decimal,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let asset = InstrumentId::new(args.asset);

    let store = Arc::new(MemoryLogStore::with_max_len(1000));
    let cancel = CancellationToken::new();
    let producer = StreamProducer::new(store.clone());

    // Synthetic book feed so the executor has prices to fill against.
    let feed = SyntheticFeed::new(asset.clone(), FeedConfig::default(), rand::random());
    let feed_task = tokio::spawn(feed.run(producer.clone(), cancel.clone()));

    // Book consumer keeps the price cache warm.
    let cache = Arc::new(PriceCache::new());
    let cache_task = {
        let store = store.clone();
        let cache = Arc::clone(&cache);
        let cancel = cancel.clone();
        let topic = Topic::orderbook(&asset);
        tokio::spawn(async move {
            let mut consumer = StreamConsumer::new(
                store,
                topic,
                ConsumerConfig {
                    name: "price-cache".to_string(),
                    start: StartPosition::Tail,
                    ..ConsumerConfig::default()
                },
            );
            consumer
                .run(cancel, move |_, update: OrderBookUpdate| {
                    let cache = Arc::clone(&cache);
                    async move {
                        cache.apply(&update);
                    }
                })
                .await
        })
    };

    // Fund both legs so buys and sells can fill.
    let portfolio = Arc::new(Portfolio::with_cash(args.cash));
    portfolio.credit(asset.as_str(), Decimal::from(100));

    let exec = Executor::new(
        store.clone(),
        Arc::clone(&cache),
        Arc::clone(&portfolio),
        ExecutorConfig::default(),
    );
    let metrics = exec.metrics();
    let executor_task = {
        let exec = exec.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { exec.run(cancel).await })
    };

    println!("Random trader started for asset {asset}");

    let pacing = PacingConfig::default();
    pacing.validate()?;
    let mut bot = SignalBot::new(asset, &pacing, rand::random());
    let mut delays = UniformDelay::new(pacing.min_delay, pacing.max_delay, rand::random());
    let inbound = Topic::signals_inbound();

    loop {
        let signal = bot.next_signal();
        match producer.publish(&inbound, &signal).await {
            Ok(_) => println!(
                "Placed {} for {} units",
                signal.action.as_str(),
                signal.amount
            ),
            Err(err) => eprintln!("Publish failed: {err}"),
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            }
            _ = tokio::time::sleep(delays.next_delay()) => {}
        }
    }

    feed_task.await??;
    cache_task.await??;
    executor_task.await??;

    println!(
        "Stopping trader... ({} fills, {} rejections)",
        metrics.fills(),
        metrics.rejections()
    );

    Ok(())
}
