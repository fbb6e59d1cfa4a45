//! ─── Sliding-window quantile calculator ─────────────────────────────────────
//!
//! Tracks a configured quantile (e.g. the median) of per-group fee samples
//! over the last `window_size` groups, storing only a run-length-encoded
//! frequency vector per group rather than the raw samples. `add` is the
//! only way the window advances; `remove_groups_ge` is how a ledger reorg
//! unwinds it.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sidetree_core::{SidetreeError, SidetreeResult};

use crate::approximator::{self, DEFAULT_BASE};
use crate::runlength;

/// One persisted observation: the group it was computed for, the quantile
/// that resulted, and the run-length-encoded aggregate frequency vector the
/// window held at that point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantileRecord {
    pub group_id: i64,
    pub quantile: u64,
    pub encoded_frequency_vector: Vec<u64>,
}

/// The quantile calculator's storage collaborator. Reads and writes may
/// perform I/O; the calculator itself holds no persistence logic.
#[async_trait]
pub trait QuantileStore: Send + Sync {
    async fn put(&self, record: QuantileRecord) -> SidetreeResult<()>;
    async fn get(&self, group_id: i64) -> SidetreeResult<Option<QuantileRecord>>;
    async fn get_first_group_id(&self) -> SidetreeResult<Option<i64>>;
    async fn get_last_group_id(&self) -> SidetreeResult<Option<i64>>;
    async fn remove_groups_ge(&self, group_id: i64) -> SidetreeResult<()>;
    async fn clear(&self) -> SidetreeResult<()>;
}

#[derive(Clone, Debug)]
pub struct QuantileConfig {
    /// Number of trailing groups the aggregate frequency vector covers.
    pub window_size: usize,
    /// Which quantile to track, e.g. `0.5` for the median.
    pub quantile_fraction: f64,
    /// Maximum fractional change from one group's quantile to the next.
    pub max_deviation_fraction: f64,
    /// Samples above this are clipped before bucketing.
    pub max_value: u64,
    /// Logarithm base the value approximator buckets on.
    pub base: f64,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            quantile_fraction: 0.5,
            max_deviation_fraction: 0.5,
            max_value: 10_000,
            base: DEFAULT_BASE,
        }
    }
}

fn build_frequency_vector(samples: &[u64], max_bucket: usize, max_value: u64, base: f64) -> Vec<u64> {
    let mut freq = vec![0u64; max_bucket + 1];
    for &sample in samples {
        let bucket = approximator::bucket_index(sample, max_value, base).min(max_bucket);
        freq[bucket] += 1;
    }
    freq
}

fn add_into(aggregated: &mut [u64], freq: &[u64]) {
    for (a, f) in aggregated.iter_mut().zip(freq) {
        *a += f;
    }
}

fn subtract_from(aggregated: &mut [u64], freq: &[u64]) {
    for (a, f) in aggregated.iter_mut().zip(freq) {
        *a = a.saturating_sub(*f);
    }
}

fn compute_quantile(aggregated: &[u64], fraction: f64, base: f64) -> u64 {
    let total: u64 = aggregated.iter().sum();
    if total == 0 {
        return 0;
    }
    let target = (fraction * total as f64).ceil() as u64;
    let mut cumulative = 0u64;
    for (bucket, &freq) in aggregated.iter().enumerate() {
        cumulative += freq;
        if cumulative >= target {
            return approximator::denormalize(bucket, base);
        }
    }
    approximator::denormalize(aggregated.len().saturating_sub(1), base)
}

fn clamp_quantile(candidate: u64, prev: u64, max_deviation_fraction: f64) -> u64 {
    if prev == 0 {
        return candidate;
    }
    let lower = (prev as f64 * (1.0 - max_deviation_fraction)).max(0.0);
    let upper = prev as f64 * (1.0 + max_deviation_fraction);
    (candidate as f64).clamp(lower, upper).round() as u64
}

pub struct SlidingWindowQuantileCalculator<S: QuantileStore> {
    store: S,
    config: QuantileConfig,
    window: VecDeque<Vec<u64>>,
    aggregated: Vec<u64>,
    prev_group_id: Option<i64>,
    prev_quantile: u64,
}

impl<S: QuantileStore> SlidingWindowQuantileCalculator<S> {
    pub fn new(store: S, config: QuantileConfig) -> Self {
        let max_bucket = approximator::max_bucket_index(config.max_value, config.base);
        Self {
            store,
            config,
            window: VecDeque::new(),
            aggregated: vec![0u64; max_bucket + 1],
            prev_group_id: None,
            prev_quantile: 0,
        }
    }

    pub fn current_quantile(&self) -> u64 {
        self.prev_quantile
    }

    /// Bootstrap a fresh calculator with `bootstrap_groups` synthetic groups
    /// of `sample_size` copies of `initial_value`, ending immediately before
    /// genesis (group `-1`), or — if the store already holds history —
    /// rebuild the in-memory window from it instead.
    ///
    /// No prior implementation of this initializer was available to copy
    /// verbatim; see the design ledger for the off-by-one this replaces.
    pub async fn initialize(&mut self, bootstrap_groups: usize, sample_size: usize, initial_value: u64) -> SidetreeResult<()> {
        if self.store.get_last_group_id().await?.is_some() {
            return self.rebuild_from_store().await;
        }
        let samples = vec![initial_value; sample_size];
        for i in 0..bootstrap_groups {
            let group_id = -(bootstrap_groups as i64) + i as i64;
            self.add(group_id, &samples).await?;
        }
        Ok(())
    }

    /// Add one group's raw samples, advancing the window and returning the
    /// freshly computed (and clamped) quantile.
    pub async fn add(&mut self, group_id: i64, samples: &[u64]) -> SidetreeResult<u64> {
        let expected = self.prev_group_id.map(|g| g + 1).unwrap_or(group_id);
        if group_id != expected {
            return Err(SidetreeError::NonSequentialGroupId { expected, got: group_id });
        }

        let max_bucket = self.aggregated.len() - 1;
        let freq = build_frequency_vector(samples, max_bucket, self.config.max_value, self.config.base);

        self.window.push_back(freq.clone());
        add_into(&mut self.aggregated, &freq);
        if self.window.len() > self.config.window_size {
            if let Some(oldest) = self.window.pop_front() {
                subtract_from(&mut self.aggregated, &oldest);
            }
        }

        let candidate = compute_quantile(&self.aggregated, self.config.quantile_fraction, self.config.base);
        let quantile = clamp_quantile(candidate, self.prev_quantile, self.config.max_deviation_fraction);

        self.store
            .put(QuantileRecord {
                group_id,
                quantile,
                encoded_frequency_vector: runlength::encode(&self.aggregated),
            })
            .await?;

        self.prev_group_id = Some(group_id);
        self.prev_quantile = quantile;
        Ok(quantile)
    }

    /// Truncate the store at `group_id` (removing it and everything after)
    /// and rebuild in-memory state from what remains.
    pub async fn remove_groups_ge(&mut self, group_id: i64) -> SidetreeResult<()> {
        self.store.remove_groups_ge(group_id).await?;
        self.rebuild_from_store().await
    }

    async fn rebuild_from_store(&mut self) -> SidetreeResult<()> {
        self.window.clear();
        self.aggregated.iter_mut().for_each(|slot| *slot = 0);
        self.prev_group_id = None;
        self.prev_quantile = 0;

        let Some(last_group_id) = self.store.get_last_group_id().await? else {
            return Ok(());
        };
        let first_group_id = self.store.get_first_group_id().await?.unwrap_or(last_group_id);
        let start = (last_group_id - self.config.window_size as i64 + 1).max(first_group_id);

        let mut loaded = Vec::new();
        for candidate_id in start..=last_group_id {
            if let Some(record) = self.store.get(candidate_id).await? {
                loaded.push(record);
            }
        }
        loaded.sort_by_key(|record| record.group_id);

        for record in &loaded {
            let freq = runlength::decode(&record.encoded_frequency_vector)?;
            self.window.push_back(freq.clone());
            add_into(&mut self.aggregated, &freq);
            if self.window.len() > self.config.window_size {
                if let Some(oldest) = self.window.pop_front() {
                    subtract_from(&mut self.aggregated, &oldest);
                }
            }
        }

        if let Some(last) = loaded.last() {
            self.prev_group_id = Some(last.group_id);
            self.prev_quantile = last.quantile;
        }
        Ok(())
    }
}
