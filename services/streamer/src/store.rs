//! Log store contract
//!
//! The bridge treats the durable log store as an external collaborator
//! reached through a narrow capability set: append one record to a named
//! topic, and blocking-read the records after a cursor. Everything else
//! (consumer groups, acknowledgement, trimming policy) belongs to the store
//! product, not to this contract.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;

pub mod memory;

/// Name of a durable append-only log.
///
/// Immutable for the lifetime of a stream. Well-known families use the
/// `<namespace>:stream:<identifier>` shape for per-instrument streams and
/// fixed names for the signal queues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Per-instrument order book stream: `orderbook:stream:<instrument>`.
    pub fn orderbook(instrument: &types::ids::InstrumentId) -> Self {
        Self(format!("orderbook:stream:{}", instrument))
    }

    /// Inbound trading signal queue.
    pub fn signals_inbound() -> Self {
        Self("signals:inbound".to_string())
    }

    /// Outbound execution result queue.
    pub fn signals_outbound() -> Self {
        Self("signals:outbound".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned record identifier.
///
/// Opaque and strictly increasing within a topic; append order is id order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Sentinel that sorts before every assigned id; reading after it
    /// yields the full history of a topic.
    pub const ZERO: RecordId = RecordId(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One durable entry in a topic.
///
/// Owned by the store; consumers hold read-only copies. Fields are a flat
/// string mapping — the envelope codec layers structure on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Store-assigned monotonic identifier
    pub id: RecordId,
    /// Field name → value mapping
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: RecordId, fields: BTreeMap<String, String>) -> Self {
        Self { id, fields }
    }
}

/// Where a blocking read starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFrom {
    /// Only records appended strictly after the read call begins.
    Tail,
    /// All records with an id strictly greater than the given one.
    /// `After(RecordId::ZERO)` reads the full history.
    After(RecordId),
}

/// Minimal capability set the bridge requires from a log store.
///
/// Implementations must assign strictly increasing ids per topic and make
/// `append` atomic: either the record is durably appended and its id
/// returned, or nothing is written.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one record to `topic`, returning the assigned id.
    async fn append(
        &self,
        topic: &Topic,
        fields: BTreeMap<String, String>,
    ) -> Result<RecordId, StoreError>;

    /// Blocking read of the records after `from`, in increasing id order.
    ///
    /// Blocks indefinitely until at least one record is available or the
    /// token is cancelled. An empty batch is returned only on cancellation;
    /// a non-empty batch never straddles the cursor.
    async fn read_after(
        &self,
        topic: &Topic,
        from: ReadFrom,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, StoreError>;
}
