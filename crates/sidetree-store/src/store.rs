//! ─── Operation store contract ───────────────────────────────────────────────
//!
//! An idempotent bag of anchored operations keyed by DID unique suffix. The
//! resolver is generic over this trait so it never depends on a concrete
//! persistence engine — only store reads perform I/O; every other step in
//! resolution is synchronous and CPU-bound.

use async_trait::async_trait;
use sidetree_core::{AnchoredOperation, SidetreeResult, Suffix, TransactionNumber};

#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Idempotent on the natural key `(suffix, transaction_number,
    /// operation_index)` — inserting the same anchored operation twice is a
    /// no-op.
    async fn insert_or_replace(&self, ops: Vec<AnchoredOperation>) -> SidetreeResult<()>;

    /// All operations for `suffix`, ordered ascending by
    /// `(transaction_number, operation_index)`.
    async fn get(&self, suffix: &Suffix) -> SidetreeResult<Vec<AnchoredOperation>>;

    /// Remove every operation whose transaction number is strictly greater
    /// than `min_transaction_number`. With `None`, clears everything —
    /// used on a ledger reorg below the given height.
    async fn delete(&self, min_transaction_number: Option<TransactionNumber>) -> SidetreeResult<()>;
}
