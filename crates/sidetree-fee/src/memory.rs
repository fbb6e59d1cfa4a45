//! Reference in-memory `QuantileStore`, keyed by group id in a `BTreeMap` so
//! first/last lookups and range truncation stay cheap and ordered.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sidetree_core::{SidetreeError, SidetreeResult};

use crate::quantile::{QuantileRecord, QuantileStore};

#[derive(Default)]
pub struct InMemoryQuantileStore {
    records: RwLock<BTreeMap<i64, QuantileRecord>>,
}

impl InMemoryQuantileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuantileStore for InMemoryQuantileStore {
    async fn put(&self, record: QuantileRecord) -> SidetreeResult<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| SidetreeError::QuantileStore("quantile store lock poisoned".into()))?;
        guard.insert(record.group_id, record);
        Ok(())
    }

    async fn get(&self, group_id: i64) -> SidetreeResult<Option<QuantileRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|_| SidetreeError::QuantileStore("quantile store lock poisoned".into()))?;
        Ok(guard.get(&group_id).cloned())
    }

    async fn get_first_group_id(&self) -> SidetreeResult<Option<i64>> {
        let guard = self
            .records
            .read()
            .map_err(|_| SidetreeError::QuantileStore("quantile store lock poisoned".into()))?;
        Ok(guard.keys().next().copied())
    }

    async fn get_last_group_id(&self) -> SidetreeResult<Option<i64>> {
        let guard = self
            .records
            .read()
            .map_err(|_| SidetreeError::QuantileStore("quantile store lock poisoned".into()))?;
        Ok(guard.keys().next_back().copied())
    }

    async fn remove_groups_ge(&self, group_id: i64) -> SidetreeResult<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| SidetreeError::QuantileStore("quantile store lock poisoned".into()))?;
        guard.retain(|&id, _| id < group_id);
        Ok(())
    }

    async fn clear(&self) -> SidetreeResult<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| SidetreeError::QuantileStore("quantile store lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(group_id: i64) -> QuantileRecord {
        QuantileRecord { group_id, quantile: 10, encoded_frequency_vector: vec![10, 1] }
    }

    #[tokio::test]
    async fn first_and_last_group_id_track_the_stored_range() {
        let store = InMemoryQuantileStore::new();
        store.put(record(5)).await.unwrap();
        store.put(record(3)).await.unwrap();
        store.put(record(7)).await.unwrap();
        assert_eq!(store.get_first_group_id().await.unwrap(), Some(3));
        assert_eq!(store.get_last_group_id().await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn remove_groups_ge_drops_the_boundary_and_everything_after() {
        let store = InMemoryQuantileStore::new();
        for id in 0..5 {
            store.put(record(id)).await.unwrap();
        }
        store.remove_groups_ge(3).await.unwrap();
        assert_eq!(store.get_last_group_id().await.unwrap(), Some(2));
        assert!(store.get(3).await.unwrap().is_none());
    }
}
