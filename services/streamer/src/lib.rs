//! Streamer — the stream production/consumption contract
//!
//! A thin bridge between market data producers and trading strategies over
//! a durable, ordered, append-only log per topic. The log store itself is
//! an external collaborator reached through the narrow [`store::LogStore`]
//! trait; everything in this crate layers on that contract:
//!
//! ```text
//! Producer ──append──▶ Log Store ──blocking read──▶ Consumer ──▶ callback
//!                      (per-topic ordered log)       (cursor)
//! ```
//!
//! Guarantees:
//! - a publish either fully succeeds or writes nothing
//! - a single producer's records arrive in call order
//! - delivery is at-least-once; callbacks tolerate duplicates
//! - a malformed record is skipped, never wedges the stream
//! - cancellation unblocks a waiting consumer promptly

pub mod consumer;
pub mod envelope;
pub mod error;
pub mod producer;
pub mod store;

pub use consumer::{ConsumerConfig, ConsumerState, ConsumerStats, StartPosition, StreamConsumer};
pub use error::{DecodeError, EncodeError, PublishError, StoreError, StreamError};
pub use producer::{AmountSampler, DelayPolicy, NoDelay, PacingConfig, StreamProducer, UniformDelay};
pub use store::memory::MemoryLogStore;
pub use store::{LogStore, ReadFrom, Record, RecordId, Topic};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
