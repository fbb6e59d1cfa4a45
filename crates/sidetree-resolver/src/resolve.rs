//! ─── Resolver algorithm ─────────────────────────────────────────────────────
//!
//! Load every operation for a suffix, apply the single effective Create, then
//! walk the recovery/deactivate chain and the update chain independently,
//! each keyed by the commitment its candidates claim to reveal. Earliest
//! `(transaction_number, operation_index)` wins per commitment; a commitment
//! is removed from its candidate map the moment it's processed so it can
//! never be revisited, which is what keeps the walk finite.

use sidetree_core::{AnchoredOperation, Config, DidState, OperationKind, SidetreeResult, Suffix};
use sidetree_crypto::canonicalize_then_double_hash_then_encode;
use sidetree_store::OperationStore;
use std::collections::HashMap;
use tracing::debug;

/// Resolve the current state of `suffix` against everything `store` holds
/// for it. `Ok(None)` means no Create ever took effect for this suffix.
pub async fn resolve(
    suffix: &Suffix,
    store: &dyn OperationStore,
    config: &Config,
) -> SidetreeResult<Option<DidState>> {
    let ops = store.get(suffix).await?;
    Ok(resolve_from_ops(&ops, config))
}

/// The pure part of resolution, split out so long-form resolution and tests
/// can drive it without an `OperationStore`.
pub fn resolve_from_ops(ops: &[AnchoredOperation], config: &Config) -> Option<DidState> {
    let mut creates = Vec::new();
    let mut updates = Vec::new();
    let mut recovery_axis = Vec::new();

    for op in ops {
        match op.kind {
            OperationKind::Create => creates.push(op.clone()),
            OperationKind::Update => updates.push(op.clone()),
            OperationKind::Recover | OperationKind::Deactivate => recovery_axis.push(op.clone()),
        }
    }
    creates.sort_by_key(|op| op.order_key());
    updates.sort_by_key(|op| op.order_key());
    recovery_axis.sort_by_key(|op| op.order_key());

    let mut state = None;
    for op in &creates {
        state = sidetree_processor::apply(op, None, config);
        if state.is_some() {
            break;
        }
    }
    let mut state = state?;

    if !recovery_axis.is_empty() {
        let mut by_commitment = bucket_recovery_axis(&recovery_axis, config);
        state = walk_chain(state, &mut by_commitment, config, |s| s.next_recovery_commitment.clone());
    }

    if !updates.is_empty() {
        let mut by_commitment = bucket_updates(&updates, config);
        state = walk_chain(state, &mut by_commitment, config, |s| s.next_update_commitment.clone());
    }

    Some(state)
}

/// Walk one commitment-keyed chain to completion, mutating `state` in place.
/// `commitment_of` extracts the axis commitment to look up next from the
/// current state — `next_recovery_commitment` for the recovery/deactivate
/// axis, `next_update_commitment` for the update axis.
fn walk_chain(
    mut state: DidState,
    by_commitment: &mut HashMap<String, Vec<AnchoredOperation>>,
    config: &Config,
    commitment_of: impl Fn(&DidState) -> Option<String>,
) -> DidState {
    loop {
        let Some(commitment) = commitment_of(&state) else {
            break;
        };
        let Some(candidates) = by_commitment.remove(&commitment) else {
            break;
        };
        let prior_txn = state.last_operation_transaction_number;
        for candidate in &candidates {
            if let Some(next) = sidetree_processor::apply(candidate, Some(state.clone()), config) {
                if next.last_operation_transaction_number > prior_txn {
                    debug!(
                        suffix = %candidate.suffix,
                        txn = candidate.transaction_number,
                        "chain step applied"
                    );
                    state = next;
                    break;
                }
            }
        }
        // Whether or not a candidate advanced the state, `commitment` has
        // been fully processed and must never be revisited.
    }
    state
}

fn bucket_recovery_axis(
    ops: &[AnchoredOperation],
    config: &Config,
) -> HashMap<String, Vec<AnchoredOperation>> {
    let mut map: HashMap<String, Vec<AnchoredOperation>> = HashMap::new();
    for op in ops {
        let Some(commitment) = reveal_commitment(op, config) else {
            continue;
        };
        map.entry(commitment).or_default().push(op.clone());
    }
    for candidates in map.values_mut() {
        candidates.sort_by_key(|op| op.order_key());
    }
    map
}

fn bucket_updates(ops: &[AnchoredOperation], config: &Config) -> HashMap<String, Vec<AnchoredOperation>> {
    bucket_recovery_axis(ops, config)
}

/// The commitment an individual recover/deactivate/update operation claims
/// to reveal — the double hash of the key embedded in its signed data.
/// Operations that fail to parse contribute no entry, which matches the
/// "malformed input is discarded" policy: they can never win a chain step.
fn reveal_commitment(op: &AnchoredOperation, config: &Config) -> Option<String> {
    match op.kind {
        OperationKind::Recover => {
            let parsed = sidetree_ops::parse_recover(&op.operation_buffer, config).ok()?;
            canonicalize_then_double_hash_then_encode(&parsed.recovery_key, config.latest_hash_algorithm, config).ok()
        }
        OperationKind::Deactivate => {
            let parsed = sidetree_ops::parse_deactivate(&op.operation_buffer, config).ok()?;
            canonicalize_then_double_hash_then_encode(&parsed.recovery_key, config.latest_hash_algorithm, config).ok()
        }
        OperationKind::Update => {
            let parsed = sidetree_ops::parse_update(&op.operation_buffer, config).ok()?;
            canonicalize_then_double_hash_then_encode(&parsed.update_key, config.latest_hash_algorithm, config).ok()
        }
        OperationKind::Create => None,
    }
}
