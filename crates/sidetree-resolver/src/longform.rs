//! ─── Long-form DID resolution ───────────────────────────────────────────────
//!
//! A long-form identifier embeds the exact bytes of its Create request so a
//! DID can be resolved before (or even without) ever reaching the ledger:
//! `did:<method>:<suffix>?-<method>-initial-state=<base64url create request>`.
//! When the suffix isn't yet known to the store, the embedded Create is
//! applied synthetically — the store itself is never touched.
//!
//! Protocol upgrades can change which hash algorithm is "latest" while a
//! long-form identifier printed under the old algorithm keeps circulating;
//! resolution re-hashes the embedded suffix data under every algorithm this
//! instance still accepts and keeps whichever reproduces the declared
//! suffix, rather than assuming the current latest algorithm produced it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sidetree_core::{AnchoredOperation, Config, DidState, OperationKind, SidetreeError, SidetreeResult, Suffix};
use sidetree_store::OperationStore;

use crate::resolve::resolve_from_ops;

struct LongFormDid {
    suffix: Suffix,
    initial_state_buffer: Vec<u8>,
}

fn parse_long_form(did: &str) -> SidetreeResult<LongFormDid> {
    let (head, query) = did
        .split_once('?')
        .ok_or_else(|| SidetreeError::MalformedRequest("long-form DID is missing its query component".to_string()))?;
    let suffix = head
        .rsplit(':')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| SidetreeError::MalformedRequest("long-form DID is missing a suffix segment".to_string()))?
        .to_string();
    let encoded = query
        .split("initial-state=")
        .nth(1)
        .ok_or_else(|| SidetreeError::MalformedRequest("long-form DID is missing initial-state".to_string()))?;
    let initial_state_buffer = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| SidetreeError::MalformedRequest(format!("long-form initial-state is not base64url: {e}")))?;
    Ok(LongFormDid {
        suffix: Suffix(suffix),
        initial_state_buffer,
    })
}

/// Find the hash algorithm (among every one this instance still accepts)
/// under which the embedded Create request's `suffixData` reproduces
/// `declared`, and package it as transaction zero of a synthetic history.
fn synthesize_create(parsed: &LongFormDid, config: &Config) -> SidetreeResult<AnchoredOperation> {
    for &algorithm in &config.hash_algorithms {
        let mut probe = config.clone();
        probe.latest_hash_algorithm = algorithm;
        if let Ok(create) = sidetree_ops::parse_create(&parsed.initial_state_buffer, &probe) {
            if create.suffix == parsed.suffix {
                return Ok(AnchoredOperation {
                    suffix: parsed.suffix.clone(),
                    kind: OperationKind::Create,
                    transaction_number: 0,
                    transaction_time: 0,
                    operation_index: 0,
                    operation_buffer: parsed.initial_state_buffer.clone(),
                });
            }
        }
    }
    Err(SidetreeError::MalformedRequest(
        "long-form initial-state does not hash to the suffix the identifier declares".to_string(),
    ))
}

/// Resolve a long-form DID. If the store already has an effective Create
/// for this suffix, the embedded initial state is ignored and resolution
/// proceeds exactly as `resolve::resolve` would. Otherwise the embedded
/// Create is synthesized as transaction zero alongside whatever else the
/// store holds for the suffix — the store is read but never written.
pub async fn resolve_long_form(
    long_form_did: &str,
    store: &dyn OperationStore,
    config: &Config,
) -> SidetreeResult<Option<DidState>> {
    let parsed = parse_long_form(long_form_did)?;
    let mut ops = store.get(&parsed.suffix).await?;

    if !ops.iter().any(|op| op.kind == OperationKind::Create) {
        let synthetic = synthesize_create(&parsed, config)?;
        ops.push(synthetic);
        ops.sort_by_key(|op| op.order_key());
    }

    Ok(resolve_from_ops(&ops, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidetree_core::Config;
    use sidetree_crypto::{canonicalize_then_double_hash_then_encode, canonicalize_then_hash};
    use sidetree_store::InMemoryOperationStore;

    fn sample_jwk() -> sidetree_crypto::jwk::Secp256k1PublicJwk {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
        sidetree_crypto::jwk::Secp256k1PublicJwk {
            kty: "EC".to_string(),
            crv: "secp256k1".to_string(),
            x: URL_SAFE_NO_PAD.encode([9u8; 32]),
            y: URL_SAFE_NO_PAD.encode([7u8; 32]),
        }
    }

    #[tokio::test]
    async fn unknown_suffix_resolves_from_embedded_create() {
        let config = Config::default();
        let jwk = sample_jwk();
        let recovery_commitment =
            canonicalize_then_double_hash_then_encode(&jwk, config.latest_hash_algorithm, &config).unwrap();
        let delta = serde_json::json!({"patches": [], "updateCommitment": "unused"});
        let delta_hash = canonicalize_then_hash(&delta, config.latest_hash_algorithm, &config).unwrap();
        let suffix_data = serde_json::json!({"deltaHash": delta_hash, "recoveryCommitment": recovery_commitment});
        let create_request = serde_json::json!({"type": "create", "suffixData": suffix_data, "delta": delta});
        let buffer = serde_json::to_vec(&create_request).unwrap();
        let suffix = canonicalize_then_hash(&suffix_data, config.latest_hash_algorithm, &config).unwrap();

        let encoded = {
            use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
            URL_SAFE_NO_PAD.encode(&buffer)
        };
        let long_form = format!("did:example:{suffix}?-example-initial-state={encoded}");

        let store = InMemoryOperationStore::default();
        let resolved = resolve_long_form(&long_form, &store, &config).await.unwrap();
        let state = resolved.expect("synthetic create must resolve");
        assert_eq!(state.next_recovery_commitment.as_deref(), Some(recovery_commitment.as_str()));
    }

    #[tokio::test]
    async fn malformed_identifier_is_rejected() {
        let config = Config::default();
        let store = InMemoryOperationStore::default();
        let result = resolve_long_form("did:example:abc", &store, &config).await;
        assert!(result.is_err());
    }
}
