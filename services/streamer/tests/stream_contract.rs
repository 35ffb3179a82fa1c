//! End-to-end tests for the stream contract
//!
//! Exercises producer → store → consumer across tasks the way the bridge
//! services do: a tail consumer started before the publish, blocking reads,
//! cancellation-driven shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use streamer::{
    ConsumerConfig, MemoryLogStore, StartPosition, StreamConsumer, StreamProducer, Topic,
};
use types::ids::{InstrumentId, StrategyId};
use types::market::{display_price, OrderBookUpdate};
use types::signal::{Side, TradingSignal};

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn tail_config(name: &str) -> ConsumerConfig {
    ConsumerConfig {
        name: name.to_string(),
        start: StartPosition::Tail,
        retry_backoff: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn signal_reaches_tail_consumer_exactly_once() {
    let store = Arc::new(MemoryLogStore::new());
    let topic = Topic::signals_inbound();
    let cancel = CancellationToken::new();

    let received = Arc::new(Mutex::new(Vec::new()));
    let consumer_task = {
        let store = store.clone();
        let topic = topic.clone();
        let cancel = cancel.clone();
        let received = Arc::clone(&received);
        tokio::spawn(async move {
            let mut consumer = StreamConsumer::new(store, topic, tail_config("executor"));
            consumer
                .run(cancel, move |_, signal: TradingSignal| {
                    let received = Arc::clone(&received);
                    async move {
                        received.lock().unwrap().push(signal);
                    }
                })
                .await
                .unwrap();
        })
    };

    // Consumer parks on the empty topic before the publish lands.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let producer = StreamProducer::new(store);
    let signal = TradingSignal::new(
        Side::Buy,
        InstrumentId::new("TOK1"),
        dec("2.50"),
        StrategyId::new("random_luck_v1"),
    );
    producer.publish(&topic, &signal).await.unwrap();

    // Let the dispatch land, then shut down.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), consumer_task)
        .await
        .unwrap()
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1, "exactly one delivery");
    assert_eq!(received[0], signal);
    // The decimal survives the wire: 2.50, not 2 and not 2.5.
    assert_eq!(received[0].amount.to_string(), "2.50");
}

#[tokio::test]
async fn one_sided_book_reports_missing_ask_as_na() {
    let store = Arc::new(MemoryLogStore::new());
    let instrument = InstrumentId::new("TOK1");
    let topic = Topic::orderbook(&instrument);
    let cancel = CancellationToken::new();

    let lines = Arc::new(Mutex::new(Vec::new()));
    let consumer_task = {
        let store = store.clone();
        let topic = topic.clone();
        let cancel = cancel.clone();
        let lines = Arc::clone(&lines);
        tokio::spawn(async move {
            let mut consumer = StreamConsumer::new(store, topic, tail_config("book-watch"));
            consumer
                .run(cancel, move |_, update: OrderBookUpdate| {
                    let lines = Arc::clone(&lines);
                    async move {
                        lines.lock().unwrap().push(format!(
                            "Bid: {} | Ask: {}",
                            display_price(update.best_bid),
                            display_price(update.best_ask),
                        ));
                    }
                })
                .await
                .unwrap();
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;

    let producer = StreamProducer::new(store);
    let update = OrderBookUpdate {
        instrument,
        best_bid: Some(dec("10.1")),
        best_ask: None,
        ts: 1,
    };
    producer.publish(&topic, &update).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), consumer_task)
        .await
        .unwrap()
        .unwrap();

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], "Bid: 10.1 | Ask: N/A");
}

#[tokio::test]
async fn independent_cursors_see_the_same_records() {
    let store = Arc::new(MemoryLogStore::new());
    let topic = Topic::signals_inbound();
    let producer = StreamProducer::new(store.clone());

    for i in 1..=3 {
        let signal = TradingSignal::new(
            Side::Sell,
            InstrumentId::new("TOK1"),
            Decimal::from(i),
            StrategyId::new("random_luck_v1"),
        );
        producer.publish(&topic, &signal).await.unwrap();
    }

    // Two consumers with their own cursors both replay the full history.
    let mut observed = Vec::new();
    for name in ["a", "b"] {
        let cancel = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut consumer = StreamConsumer::new(
            store.clone(),
            topic.clone(),
            ConsumerConfig {
                name: name.to_string(),
                start: StartPosition::Beginning,
                retry_backoff: Duration::from_millis(50),
            },
        );
        {
            let cancel = cancel.clone();
            let seen = Arc::clone(&seen);
            consumer
                .run(cancel.clone(), move |_, signal: TradingSignal| {
                    let seen = Arc::clone(&seen);
                    let cancel = cancel.clone();
                    async move {
                        let mut seen = seen.lock().unwrap();
                        seen.push(signal.amount);
                        if seen.len() == 3 {
                            cancel.cancel();
                        }
                    }
                })
                .await
                .unwrap();
        }
        observed.push(Arc::try_unwrap(seen).unwrap().into_inner().unwrap());
    }

    assert_eq!(observed[0], observed[1]);
    assert_eq!(observed[0].len(), 3);
}
