//! In-process log store
//!
//! Backs tests and the in-process demos. Records live in per-topic vectors
//! under one mutex; readers park on a watch channel that publishes the
//! topic's high-water mark, so an append wakes every blocked reader without
//! polling. Ids are assigned from a per-topic monotonic counter starting
//! at 1.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{LogStore, ReadFrom, Record, RecordId, Topic};

struct TopicLog {
    records: VecDeque<Record>,
    next_seq: u64,
    /// High-water mark channel; the value is the last assigned id.
    watermark: watch::Sender<u64>,
}

impl TopicLog {
    fn new() -> Self {
        let (watermark, _) = watch::channel(0);
        Self {
            records: VecDeque::new(),
            next_seq: 1,
            watermark,
        }
    }

    fn last_id(&self) -> u64 {
        self.next_seq - 1
    }
}

/// Configuration for the in-process store.
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Per-topic record cap; oldest records are trimmed past it.
    /// `None` keeps the full history.
    pub max_len: Option<usize>,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self { max_len: None }
    }
}

/// Process-local append-only log keyed by topic name.
pub struct MemoryLogStore {
    topics: Mutex<HashMap<String, TopicLog>>,
    config: MemoryStoreConfig,
}

impl MemoryLogStore {
    /// Create a store with unbounded topics.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Create a store that trims each topic to the newest `max_len` records.
    pub fn with_max_len(max_len: usize) -> Self {
        Self::with_config(MemoryStoreConfig {
            max_len: Some(max_len),
        })
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Number of records currently held for a topic.
    pub fn len(&self, topic: &Topic) -> usize {
        self.topics
            .lock()
            .map(|topics| {
                topics
                    .get(topic.as_str())
                    .map(|log| log.records.len())
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Last assigned id for a topic, if any record was ever appended.
    pub fn last_id(&self, topic: &Topic) -> Option<RecordId> {
        self.topics.lock().ok().and_then(|topics| {
            topics.get(topic.as_str()).and_then(|log| {
                let last = log.last_id();
                if last == 0 {
                    None
                } else {
                    Some(RecordId::new(last))
                }
            })
        })
    }

    fn collect_after(log: &TopicLog, after: u64) -> Vec<Record> {
        log.records
            .iter()
            .filter(|record| record.id.value() > after)
            .cloned()
            .collect()
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(
        &self,
        topic: &Topic,
        fields: BTreeMap<String, String>,
    ) -> Result<RecordId, StoreError> {
        let id = {
            let mut topics = self
                .topics
                .lock()
                .map_err(|_| StoreError::Unavailable {
                    reason: "store lock poisoned".to_string(),
                })?;
            let log = topics
                .entry(topic.as_str().to_string())
                .or_insert_with(TopicLog::new);

            let id = RecordId::new(log.next_seq);
            log.next_seq += 1;
            log.records.push_back(Record::new(id, fields));

            if let Some(max_len) = self.config.max_len {
                while log.records.len() > max_len {
                    log.records.pop_front();
                }
            }

            // Wake blocked readers; append and watermark move together
            // under the lock, so readers never see one without the other.
            let _ = log.watermark.send(id.value());
            id
        };

        debug!(topic = %topic, record_id = %id, "record appended");
        Ok(id)
    }

    async fn read_after(
        &self,
        topic: &Topic,
        from: ReadFrom,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, StoreError> {
        // Tail resolves once, when the call begins; later iterations reuse it.
        let mut after: Option<u64> = match from {
            ReadFrom::After(id) => Some(id.value()),
            ReadFrom::Tail => None,
        };

        loop {
            let mut watermark_rx = {
                let mut topics = self
                    .topics
                    .lock()
                    .map_err(|_| StoreError::Unavailable {
                        reason: "store lock poisoned".to_string(),
                    })?;
                let log = topics
                    .entry(topic.as_str().to_string())
                    .or_insert_with(TopicLog::new);

                let cursor = *after.get_or_insert(log.last_id());
                let batch = Self::collect_after(log, cursor);
                if !batch.is_empty() {
                    return Ok(batch);
                }
                // Subscribe while the lock is held so no append can slip
                // between the emptiness check and the wait.
                log.watermark.subscribe()
            };

            tokio::select! {
                changed = watermark_rx.changed() => {
                    changed.map_err(|_| StoreError::Closed)?;
                }
                _ = cancel.cancelled() => {
                    return Ok(Vec::new());
                }
            }
        }
    }
}
