//! Execution Engine
//!
//! Turns trading signals into fills:
//!
//! ```text
//! signals:inbound ──▶ Executor ──▶ signals:outbound
//!                        │
//!            ┌───────────┴───────────┐
//!            │                       │
//!       PriceCache              Portfolio
//!   (top of book, fed by    (cash + holdings,
//!    the book consumer)      atomic settlement)
//! ```
//!
//! Fills are priced at the touch — best ask for buys, best bid for sells —
//! and rejected when the instrument is unknown, the quote is stale, the
//! fill side is unquoted, or the portfolio cannot cover the trade.

pub mod engine;
pub mod portfolio;
pub mod price_cache;

pub use engine::{now_nanos, Executor, ExecutorConfig, ExecutorMetrics};
pub use portfolio::{Portfolio, CASH_ASSET};
pub use price_cache::{PriceCache, Quote};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
