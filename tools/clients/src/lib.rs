//! Client tools for the market data bridge
//!
//! Building blocks for the runnable demos: a synthetic book feed standing in
//! for a venue connection, and the random trader bot. The binaries wire
//! these over an in-process store together with the stream consumer and the
//! execution engine.

pub mod feed;
pub mod trader;

pub use feed::{FeedConfig, SyntheticFeed};
pub use trader::{SignalBot, STRATEGY_ID};
