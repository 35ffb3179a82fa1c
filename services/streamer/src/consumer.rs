//! Stream consumer
//!
//! Maintains a resumable cursor over one topic, performs blocking reads
//! starting at that cursor, decodes each record in arrival order and hands
//! it to the registered callback, then advances the cursor.
//!
//! Delivery is at-least-once: a record may be redelivered if a failure lands
//! between dispatch and cursor advance, so callbacks must tolerate
//! duplicates. A record that fails to decode is logged and skipped — the
//! cursor still advances, so one malformed message never wedges the stream.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::envelope;
use crate::error::StreamError;
use crate::store::{LogStore, ReadFrom, RecordId, Topic};

/// Where a consumer's cursor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPosition {
    /// Only records appended after the read loop starts.
    #[default]
    Tail,
    /// The topic's full retained history.
    Beginning,
}

/// Consumer lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Created, cursor not yet resolved.
    Initializing,
    /// Blocked on the store waiting for records.
    Waiting,
    /// Delivering a batch to the callback.
    Dispatching,
    /// Terminal; the loop has released its blocking read.
    Stopped,
}

/// Configuration for a stream consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Name used in log lines.
    pub name: String,
    /// Cursor start position.
    pub start: StartPosition,
    /// Delay before re-issuing the blocking read after a store failure.
    pub retry_backoff: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            name: "consumer".to_string(),
            start: StartPosition::Tail,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// Counters accumulated over a consumer's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Records decoded and handed to the callback.
    pub dispatched: u64,
    /// Records skipped because the envelope would not decode.
    pub decode_failures: u64,
    /// Blocking reads re-issued after a store failure.
    pub retries: u64,
}

/// Cursor-based consumer of one topic.
///
/// Each instance owns its cursor exclusively; run one loop per instance.
pub struct StreamConsumer {
    store: Arc<dyn LogStore>,
    topic: Topic,
    config: ConsumerConfig,
    state: ConsumerState,
    cursor: Option<RecordId>,
    stats: ConsumerStats,
}

impl StreamConsumer {
    pub fn new(store: Arc<dyn LogStore>, topic: Topic, config: ConsumerConfig) -> Self {
        Self {
            store,
            topic,
            config,
            state: ConsumerState::Initializing,
            cursor: None,
            stats: ConsumerStats::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConsumerState {
        self.state
    }

    /// Last record id the cursor advanced to, if any.
    pub fn last_cursor(&self) -> Option<RecordId> {
        self.cursor
    }

    /// Lifetime counters.
    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    /// Drive the read/dispatch loop until the token is cancelled.
    ///
    /// Every decodable record is passed to `handler` in strictly increasing
    /// id order; the cursor advances after each record, decodable or not.
    /// Store failures re-issue the read from the last advanced cursor after
    /// `retry_backoff`. Cancellation is observed while blocked on the store
    /// and between records of a batch.
    pub async fn run<T, F, Fut>(
        &mut self,
        cancel: CancellationToken,
        mut handler: F,
    ) -> Result<(), StreamError>
    where
        T: DeserializeOwned,
        F: FnMut(RecordId, T) -> Fut,
        Fut: Future<Output = ()>,
    {
        info!(
            consumer = %self.config.name,
            topic = %self.topic,
            start = ?self.config.start,
            "consumer starting"
        );

        'read: while !cancel.is_cancelled() {
            let from = match self.cursor {
                Some(id) => ReadFrom::After(id),
                None => match self.config.start {
                    StartPosition::Tail => ReadFrom::Tail,
                    StartPosition::Beginning => ReadFrom::After(RecordId::ZERO),
                },
            };

            self.state = ConsumerState::Waiting;
            match self.store.read_after(&self.topic, from, &cancel).await {
                Ok(batch) => {
                    if batch.is_empty() {
                        // Only returned on cancellation.
                        break 'read;
                    }
                    self.state = ConsumerState::Dispatching;
                    for record in batch {
                        if cancel.is_cancelled() {
                            break 'read;
                        }
                        match envelope::decode::<T>(&record) {
                            Ok(payload) => {
                                handler(record.id, payload).await;
                                self.stats.dispatched += 1;
                                debug!(
                                    consumer = %self.config.name,
                                    record_id = %record.id,
                                    "record dispatched"
                                );
                            }
                            Err(err) => {
                                self.stats.decode_failures += 1;
                                warn!(
                                    consumer = %self.config.name,
                                    topic = %self.topic,
                                    record_id = %record.id,
                                    error = %err,
                                    "skipping undecodable record"
                                );
                            }
                        }
                        self.cursor = Some(record.id);
                    }
                }
                Err(err) => {
                    self.stats.retries += 1;
                    warn!(
                        consumer = %self.config.name,
                        topic = %self.topic,
                        error = %err,
                        backoff = ?self.config.retry_backoff,
                        "store read failed, retrying from last cursor"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.retry_backoff) => {}
                        _ = cancel.cancelled() => break 'read,
                    }
                }
            }
        }

        self.state = ConsumerState::Stopped;
        info!(
            consumer = %self.config.name,
            topic = %self.topic,
            dispatched = self.stats.dispatched,
            decode_failures = self.stats.decode_failures,
            "consumer stopped"
        );
        Ok(())
    }
}
