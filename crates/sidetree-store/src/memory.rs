use crate::store::OperationStore;
use async_trait::async_trait;
use sidetree_core::{AnchoredOperation, SidetreeResult, Suffix, TransactionNumber};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use tracing::debug;

/// Reference `OperationStore` backed by an in-memory map, one `BTreeSet` per
/// suffix ordered by `AnchoredOperation::order_key`. No persistence, no
/// external dependencies — suitable for embedding a resolver in a test or a
/// single-process node.
#[derive(Default)]
pub struct InMemoryOperationStore {
    by_suffix: RwLock<HashMap<Suffix, BTreeSet<AnchoredOperation>>>,
}

impl InMemoryOperationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationStore for InMemoryOperationStore {
    async fn insert_or_replace(&self, ops: Vec<AnchoredOperation>) -> SidetreeResult<()> {
        let mut guard = self.by_suffix.write().map_err(|_| {
            sidetree_core::SidetreeError::Store("operation store lock poisoned".into())
        })?;
        for op in ops {
            let bucket = guard.entry(op.suffix.clone()).or_default();
            // `BTreeSet::insert` is already a no-op for an equal element, and
            // `AnchoredOperation`'s `Eq` is defined purely on `order_key` —
            // this gives idempotent insert for free.
            bucket.insert(op);
        }
        Ok(())
    }

    async fn get(&self, suffix: &Suffix) -> SidetreeResult<Vec<AnchoredOperation>> {
        let guard = self.by_suffix.read().map_err(|_| {
            sidetree_core::SidetreeError::Store("operation store lock poisoned".into())
        })?;
        Ok(guard.get(suffix).map(|set| set.iter().cloned().collect()).unwrap_or_default())
    }

    async fn delete(&self, min_transaction_number: Option<TransactionNumber>) -> SidetreeResult<()> {
        let mut guard = self.by_suffix.write().map_err(|_| {
            sidetree_core::SidetreeError::Store("operation store lock poisoned".into())
        })?;
        match min_transaction_number {
            None => {
                debug!("clearing entire operation store");
                guard.clear();
            }
            Some(threshold) => {
                for bucket in guard.values_mut() {
                    bucket.retain(|op| op.transaction_number <= threshold);
                }
                guard.retain(|_, bucket| !bucket.is_empty());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidetree_core::OperationKind;

    fn op(suffix: &str, txn: u64, idx: u32) -> AnchoredOperation {
        AnchoredOperation {
            suffix: Suffix(suffix.to_string()),
            kind: OperationKind::Update,
            transaction_number: txn,
            transaction_time: 0,
            operation_index: idx,
            operation_buffer: vec![],
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent() {
        let store = InMemoryOperationStore::new();
        let suffix = Suffix("abc".to_string());
        store.insert_or_replace(vec![op("abc", 1, 0)]).await.unwrap();
        store.insert_or_replace(vec![op("abc", 1, 0)]).await.unwrap();
        assert_eq!(store.get(&suffix).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_is_ordered_by_transaction_then_index() {
        let store = InMemoryOperationStore::new();
        let suffix = Suffix("abc".to_string());
        store
            .insert_or_replace(vec![op("abc", 2, 0), op("abc", 1, 1), op("abc", 1, 0)])
            .await
            .unwrap();
        let ops = store.get(&suffix).await.unwrap();
        let keys: Vec<_> = ops.iter().map(|o| o.order_key()).collect();
        assert_eq!(keys, vec![(1, 0), (1, 1), (2, 0)]);
    }

    #[tokio::test]
    async fn delete_above_threshold_keeps_lower_transactions() {
        let store = InMemoryOperationStore::new();
        let suffix = Suffix("abc".to_string());
        store
            .insert_or_replace(vec![op("abc", 1, 0), op("abc", 2, 0), op("abc", 3, 0)])
            .await
            .unwrap();
        store.delete(Some(2)).await.unwrap();
        let ops = store.get(&suffix).await.unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|o| o.transaction_number <= 2));
    }

    #[tokio::test]
    async fn delete_with_no_threshold_clears_everything() {
        let store = InMemoryOperationStore::new();
        let suffix = Suffix("abc".to_string());
        store.insert_or_replace(vec![op("abc", 1, 0)]).await.unwrap();
        store.delete(None).await.unwrap();
        assert!(store.get(&suffix).await.unwrap().is_empty());
    }
}
