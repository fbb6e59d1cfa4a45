//! ─── Operation processor ────────────────────────────────────────────────────
//!
//! `apply` is the whole contract: `(anchored_op, state | none) -> state |
//! none`, pure and total. Every failure path — malformed request, hash
//! mismatch, bad signature, wrong precondition — returns the input state
//! unchanged (or `None` for a failed Create) rather than propagating an
//! error. Only the caller's logging sees *why* an operation was a no-op.

use sidetree_core::{AnchoredOperation, Config, DidState, Document, OperationKind};
use sidetree_crypto::{canonicalize_then_double_hash_then_encode, canonicalize_then_hash, jws};
use tracing::{debug, info};

/// Apply one anchored operation to `current`, returning the resulting state.
pub fn apply(op: &AnchoredOperation, current: Option<DidState>, config: &Config) -> Option<DidState> {
    match op.kind {
        OperationKind::Create => apply_create(op, current, config),
        OperationKind::Update => apply_update(op, current, config),
        OperationKind::Recover => apply_recover(op, current, config),
        OperationKind::Deactivate => apply_deactivate(op, current, config),
    }
}

fn apply_create(op: &AnchoredOperation, current: Option<DidState>, config: &Config) -> Option<DidState> {
    if current.is_some() {
        debug!(suffix = %op.suffix, "ignoring create on an already-initialized suffix");
        return current;
    }

    let parsed = match sidetree_ops::parse_create(&op.operation_buffer, config) {
        Ok(p) => p,
        Err(e) => {
            info!(suffix = %op.suffix, error = %e, "discarding malformed create");
            return None;
        }
    };
    if parsed.suffix != op.suffix {
        info!(suffix = %op.suffix, computed = %parsed.suffix, "create's computed suffix does not match anchored suffix");
        return None;
    }

    let mut state = DidState {
        document: Document::empty(),
        next_recovery_commitment: Some(parsed.suffix_data.recovery_commitment.clone()),
        next_update_commitment: None,
        last_operation_transaction_number: op.transaction_number,
    };

    if let Some(delta) = &parsed.delta {
        let actual_hash = canonicalize_then_hash(delta, config.latest_hash_algorithm, config);
        if actual_hash.as_deref().ok() == Some(parsed.delta_hash.as_str()) {
            state.next_update_commitment = Some(delta.update_commitment.clone());
            match sidetree_ops::apply_patches(&Document::empty(), &delta.patches, config) {
                Ok(document) => state.document = document,
                Err(e) => info!(suffix = %op.suffix, error = %e, "create delta patches rejected, document left empty"),
            }
        }
    }

    Some(state)
}

fn apply_update(op: &AnchoredOperation, current: Option<DidState>, config: &Config) -> Option<DidState> {
    let current = current?;

    let Some(next_update_commitment) = current.next_update_commitment.clone() else {
        debug!(suffix = %op.suffix, "no update commitment outstanding, ignoring update");
        return Some(current);
    };

    let parsed = match sidetree_ops::parse_update(&op.operation_buffer, config) {
        Ok(p) => p,
        Err(e) => {
            info!(suffix = %op.suffix, error = %e, "discarding malformed update");
            return Some(current);
        }
    };
    if parsed.suffix != op.suffix {
        return Some(current);
    }

    let commitment = match canonicalize_then_double_hash_then_encode(&parsed.update_key, config.latest_hash_algorithm, config) {
        Ok(c) => c,
        Err(_) => return Some(current),
    };
    if commitment != next_update_commitment {
        info!(suffix = %op.suffix, "update reveal key does not match outstanding commitment");
        return Some(current);
    }

    if jws::verify(&parsed.jws, &parsed.update_key, config).is_err() {
        info!(suffix = %op.suffix, "update signature verification failed");
        return Some(current);
    }

    let Some(delta) = &parsed.delta else {
        return Some(current);
    };
    let actual_hash = canonicalize_then_hash(delta, config.latest_hash_algorithm, config);
    if actual_hash.as_deref().ok() != Some(parsed.delta_hash.as_str()) {
        return Some(current);
    }

    match sidetree_ops::apply_patches(&current.document, &delta.patches, config) {
        Ok(document) => Some(DidState {
            document,
            next_recovery_commitment: current.next_recovery_commitment.clone(),
            next_update_commitment: Some(delta.update_commitment.clone()),
            last_operation_transaction_number: op.transaction_number,
        }),
        Err(e) => {
            info!(suffix = %op.suffix, error = %e, "update delta patches rejected");
            Some(current)
        }
    }
}

fn apply_recover(op: &AnchoredOperation, current: Option<DidState>, config: &Config) -> Option<DidState> {
    let current = current?;

    let Some(next_recovery_commitment) = current.next_recovery_commitment.clone() else {
        debug!(suffix = %op.suffix, "did is deactivated, ignoring recover");
        return Some(current);
    };

    let parsed = match sidetree_ops::parse_recover(&op.operation_buffer, config) {
        Ok(p) => p,
        Err(e) => {
            info!(suffix = %op.suffix, error = %e, "discarding malformed recover");
            return Some(current);
        }
    };
    if parsed.suffix != op.suffix {
        return Some(current);
    }

    let commitment = match canonicalize_then_double_hash_then_encode(&parsed.recovery_key, config.latest_hash_algorithm, config) {
        Ok(c) => c,
        Err(_) => return Some(current),
    };
    if commitment != next_recovery_commitment {
        info!(suffix = %op.suffix, "recover reveal key does not match outstanding commitment");
        return Some(current);
    }

    if jws::verify(&parsed.jws, &parsed.recovery_key, config).is_err() {
        info!(suffix = %op.suffix, "recover signature verification failed");
        return Some(current);
    }

    let mut state = DidState {
        document: Document::empty(),
        next_recovery_commitment: Some(parsed.recovery_commitment.clone()),
        next_update_commitment: None,
        last_operation_transaction_number: op.transaction_number,
    };

    if let Some(delta) = &parsed.delta {
        let actual_hash = canonicalize_then_hash(delta, config.latest_hash_algorithm, config);
        if actual_hash.as_deref().ok() == Some(parsed.delta_hash.as_str()) {
            state.next_update_commitment = Some(delta.update_commitment.clone());
            match sidetree_ops::apply_patches(&Document::empty(), &delta.patches, config) {
                Ok(document) => state.document = document,
                Err(e) => info!(suffix = %op.suffix, error = %e, "recover delta patches rejected, document left empty"),
            }
        }
    }

    Some(state)
}

fn apply_deactivate(op: &AnchoredOperation, current: Option<DidState>, config: &Config) -> Option<DidState> {
    let current = current?;

    let Some(next_recovery_commitment) = current.next_recovery_commitment.clone() else {
        debug!(suffix = %op.suffix, "did already deactivated, ignoring deactivate");
        return Some(current);
    };

    let parsed = match sidetree_ops::parse_deactivate(&op.operation_buffer, config) {
        Ok(p) => p,
        Err(e) => {
            info!(suffix = %op.suffix, error = %e, "discarding malformed deactivate");
            return Some(current);
        }
    };
    if parsed.suffix != op.suffix {
        return Some(current);
    }

    let commitment = match canonicalize_then_double_hash_then_encode(&parsed.recovery_key, config.latest_hash_algorithm, config) {
        Ok(c) => c,
        Err(_) => return Some(current),
    };
    if commitment != next_recovery_commitment {
        info!(suffix = %op.suffix, "deactivate reveal key does not match outstanding commitment");
        return Some(current);
    }

    if jws::verify(&parsed.jws, &parsed.recovery_key, config).is_err() {
        info!(suffix = %op.suffix, "deactivate signature verification failed");
        return Some(current);
    }

    Some(DidState {
        document: current.document.clone(),
        next_recovery_commitment: None,
        next_update_commitment: None,
        last_operation_transaction_number: op.transaction_number,
    })
}
