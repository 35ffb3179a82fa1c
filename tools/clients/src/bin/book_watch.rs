//! Order book listener
//!
//! Streams top-of-book snapshots for one instrument and prints a
//! timestamped line per update. The book is fed by the embedded synthetic
//! feed; absent sides print as `N/A`.

use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use clients::{FeedConfig, SyntheticFeed};
use streamer::{
    ConsumerConfig, MemoryLogStore, StartPosition, StreamConsumer, StreamProducer, Topic,
};
use types::ids::InstrumentId;
use types::market::{display_price, OrderBookUpdate};

/// Listen for order book updates on one instrument.
#[derive(Parser)]
#[command(name = "book-watch")]
struct Args {
    /// Instrument identifier to watch
    instrument: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let instrument = InstrumentId::new(args.instrument);
    let topic = Topic::orderbook(&instrument);

    let store = Arc::new(MemoryLogStore::with_max_len(1000));
    let cancel = CancellationToken::new();

    // Embedded feed in place of a venue connection.
    let feed = SyntheticFeed::new(instrument, FeedConfig::default(), rand::random());
    let feed_task = tokio::spawn(feed.run(StreamProducer::new(store.clone()), cancel.clone()));

    println!("Listening for updates on {topic}...");

    let consumer_task = {
        let store = store.clone();
        let topic = topic.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut consumer = StreamConsumer::new(
                store,
                topic,
                ConsumerConfig {
                    name: "book-watch".to_string(),
                    start: StartPosition::Tail,
                    ..ConsumerConfig::default()
                },
            );
            consumer
                .run(cancel, |_, update: OrderBookUpdate| async move {
                    println!(
                        "[{}] Bid: {} | Ask: {}",
                        Local::now().format("%H:%M:%S"),
                        display_price(update.best_bid),
                        display_price(update.best_ask),
                    );
                })
                .await
        })
    };

    tokio::signal::ctrl_c().await?;
    cancel.cancel();

    feed_task.await??;
    consumer_task.await??;
    println!("Stopping...");

    Ok(())
}
