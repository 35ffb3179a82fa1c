//! Stream producer
//!
//! Appends domain events to a named topic as single-envelope records. A
//! publish either fully succeeds (record durably appended, id returned) or
//! fails with [`PublishError`] and writes nothing.
//!
//! Pacing and amount sampling are client knobs, not protocol: they live in
//! an injectable [`DelayPolicy`] and an [`AmountSampler`] so tests can run
//! with zero delay deterministically.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::envelope;
use crate::error::{PublishError, StreamError};
use crate::store::{LogStore, RecordId, Topic};

/// Publishes domain events to topics on a shared store handle.
///
/// Safe to call concurrently; ordering is guaranteed per caller only.
#[derive(Clone)]
pub struct StreamProducer {
    store: Arc<dyn LogStore>,
}

impl StreamProducer {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Append one record carrying `payload` in the envelope field.
    pub async fn publish<T: Serialize>(
        &self,
        topic: &Topic,
        payload: &T,
    ) -> Result<RecordId, PublishError> {
        let fields = envelope::fields_for(payload)?;
        let id = self.store.append(topic, fields).await?;
        debug!(topic = %topic, record_id = %id, "published");
        Ok(id)
    }

    /// Append one record carrying `payload` plus extra routing fields.
    ///
    /// The payload still rides in the envelope field; tags sit alongside it
    /// (the outbound result queue tags each record with its strategy id).
    pub async fn publish_tagged<T: Serialize>(
        &self,
        topic: &Topic,
        tags: &[(&str, &str)],
        payload: &T,
    ) -> Result<RecordId, PublishError> {
        let mut fields: BTreeMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        fields.insert(envelope::DATA_FIELD.to_string(), envelope::encode(payload)?);
        let id = self.store.append(topic, fields).await?;
        debug!(topic = %topic, record_id = %id, "published");
        Ok(id)
    }
}

/// Pacing and sizing knobs for a paced producer.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Minimum inter-publish delay
    pub min_delay: Duration,
    /// Maximum inter-publish delay
    pub max_delay: Duration,
    /// Minimum sampled amount
    pub min_amount: Decimal,
    /// Maximum sampled amount
    pub max_amount: Decimal,
    /// Decimal places amounts are rounded to
    pub rounding_dp: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(15),
            min_amount: Decimal::from_str_exact("0.1").unwrap(),
            max_amount: Decimal::from_str_exact("5.0").unwrap(),
            rounding_dp: 2,
        }
    }
}

impl PacingConfig {
    /// Check the knob invariants before any loop starts.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.min_delay > self.max_delay {
            return Err(StreamError::Configuration {
                reason: format!(
                    "min_delay {:?} exceeds max_delay {:?}",
                    self.min_delay, self.max_delay
                ),
            });
        }
        if self.min_amount <= Decimal::ZERO || self.min_amount > self.max_amount {
            return Err(StreamError::Configuration {
                reason: format!(
                    "amount range [{}, {}] is not positive and ordered",
                    self.min_amount, self.max_amount
                ),
            });
        }
        Ok(())
    }
}

/// Inter-publish delay policy.
pub trait DelayPolicy: Send {
    fn next_delay(&mut self) -> Duration;
}

/// Uniformly random delay in a closed range, from a seeded RNG.
pub struct UniformDelay {
    min: Duration,
    max: Duration,
    rng: ChaCha8Rng,
}

impl UniformDelay {
    pub fn new(min: Duration, max: Duration, seed: u64) -> Self {
        Self {
            min,
            max,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DelayPolicy for UniformDelay {
    fn next_delay(&mut self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = self.rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Zero delay, for deterministic tests.
pub struct NoDelay;

impl DelayPolicy for NoDelay {
    fn next_delay(&mut self) -> Duration {
        Duration::ZERO
    }
}

/// Uniformly random decimal amounts in a closed range, rounded to a fixed
/// number of decimal places.
pub struct AmountSampler {
    min: Decimal,
    max: Decimal,
    dp: u32,
    rng: ChaCha8Rng,
}

impl AmountSampler {
    pub fn new(min: Decimal, max: Decimal, dp: u32, seed: u64) -> Self {
        Self {
            min,
            max,
            dp,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &PacingConfig, seed: u64) -> Self {
        Self::new(config.min_amount, config.max_amount, config.rounding_dp, seed)
    }

    /// Draw one amount; always positive and within the configured range
    /// after rounding.
    pub fn sample(&mut self) -> Decimal {
        let min_f = self.min.to_f64().unwrap_or(0.1);
        let max_f = self.max.to_f64().unwrap_or(1.0);
        let raw: f64 = self.rng.gen_range(min_f..=max_f);
        let amount = Decimal::from_f64(raw).unwrap_or(self.min).round_dp(self.dp);
        if amount < self.min {
            self.min
        } else if amount > self.max {
            self.max
        } else {
            amount
        }
    }
}
