//! ─── Operation parsers ──────────────────────────────────────────────────────
//!
//! One function per operation kind. Each enforces the request's exact shape
//! (via `deny_unknown_fields` on the wire structs), validates every hash and
//! key field, and produces a `Parsed*` value the processor can act on without
//! re-touching raw bytes. A malformed `delta` degrades to `None` rather than
//! failing the whole operation — everything else is a hard failure.

use crate::wire::{
    DeactivateSignedPayload, RecoverSignedPayload, UpdateSignedPayload, WireCreateRequest,
    WireDeactivateRequest, WireRecoverRequest, WireSuffixData, WireUpdateRequest,
};
use serde_json::Value;
use sidetree_core::{Config, Delta, SidetreeError, SidetreeResult, Suffix};
use sidetree_crypto::jwk::Secp256k1PublicJwk;
use sidetree_crypto::{canonicalize_then_hash, canonicalize_to_bytes, verify_encoded_multihash, CompactJws};

pub struct ParsedCreate {
    pub suffix: Suffix,
    pub suffix_data: WireSuffixData,
    pub delta_hash: String,
    pub delta: Option<Delta>,
}

pub struct ParsedUpdate {
    pub suffix: Suffix,
    pub jws: String,
    pub update_key: Secp256k1PublicJwk,
    pub delta_hash: String,
    pub delta: Option<Delta>,
}

pub struct ParsedRecover {
    pub suffix: Suffix,
    pub jws: String,
    pub recovery_key: Secp256k1PublicJwk,
    pub recovery_commitment: String,
    pub delta_hash: String,
    pub delta: Option<Delta>,
}

pub struct ParsedDeactivate {
    pub suffix: Suffix,
    pub jws: String,
    pub recovery_key: Secp256k1PublicJwk,
}

fn check_size(buffer: &[u8], config: &Config) -> SidetreeResult<()> {
    if buffer.len() > config.max_operation_size {
        return Err(SidetreeError::OperationTooLarge {
            max: config.max_operation_size,
        });
    }
    Ok(())
}

/// Parse a `delta` value that arrived as a raw JSON value, degrading to
/// `None` on any structural problem rather than failing the operation.
fn try_parse_delta(raw: Option<Value>, config: &Config) -> Option<Delta> {
    let raw = raw?;
    let delta: Delta = serde_json::from_value(raw).ok()?;
    if delta.patches.len() > config.max_patches {
        return None;
    }
    let canonical = canonicalize_to_bytes(&delta).ok()?;
    if canonical.len() > config.max_delta_size {
        return None;
    }
    Some(delta)
}

/// Validate that `reveal_value` is the single-hash of the canonicalized key
/// — the parser's own preimage check, independent of the processor's later
/// commitment (double-hash) comparison.
fn check_reveal_matches_key(
    reveal_value: &str,
    key: &Secp256k1PublicJwk,
    config: &Config,
) -> SidetreeResult<()> {
    let canonical = canonicalize_to_bytes(key)?;
    if !verify_encoded_multihash(&canonical, reveal_value, config) {
        return Err(SidetreeError::RevealMismatch);
    }
    Ok(())
}

pub fn parse_create(buffer: &[u8], config: &Config) -> SidetreeResult<ParsedCreate> {
    check_size(buffer, config)?;
    let wire: WireCreateRequest = serde_json::from_slice(buffer)
        .map_err(|e| SidetreeError::MalformedRequest(format!("create request: {e}")))?;
    if wire.kind != "create" {
        return Err(SidetreeError::MalformedRequest(format!(
            "expected type \"create\", got {:?}",
            wire.kind
        )));
    }

    let suffix_hash = canonicalize_then_hash(&wire.suffix_data, config.latest_hash_algorithm, config)?;
    let suffix = Suffix(suffix_hash);

    let delta_hash = wire.suffix_data.delta_hash.clone();
    let delta = try_parse_delta(wire.delta.clone(), config);

    Ok(ParsedCreate {
        suffix,
        suffix_data: wire.suffix_data,
        delta_hash,
        delta,
    })
}

pub fn parse_update(buffer: &[u8], config: &Config) -> SidetreeResult<ParsedUpdate> {
    check_size(buffer, config)?;
    let wire: WireUpdateRequest = serde_json::from_slice(buffer)
        .map_err(|e| SidetreeError::MalformedRequest(format!("update request: {e}")))?;
    if wire.kind != "update" {
        return Err(SidetreeError::MalformedRequest(format!(
            "expected type \"update\", got {:?}",
            wire.kind
        )));
    }

    let jws = CompactJws::parse(&wire.signed_data)?;
    let payload_bytes = jws.decode_payload()?;
    let payload: UpdateSignedPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| SidetreeError::InvalidJws(format!("update signed_data payload: {e}")))?;
    payload.update_key.validate()?;

    check_reveal_matches_key(&wire.reveal_value, &payload.update_key, config)?;

    let delta = try_parse_delta(wire.delta.clone(), config);

    Ok(ParsedUpdate {
        suffix: Suffix(wire.did_suffix),
        jws: wire.signed_data,
        update_key: payload.update_key,
        delta_hash: payload.delta_hash,
        delta,
    })
}

pub fn parse_recover(buffer: &[u8], config: &Config) -> SidetreeResult<ParsedRecover> {
    check_size(buffer, config)?;
    let wire: WireRecoverRequest = serde_json::from_slice(buffer)
        .map_err(|e| SidetreeError::MalformedRequest(format!("recover request: {e}")))?;
    if wire.kind != "recover" {
        return Err(SidetreeError::MalformedRequest(format!(
            "expected type \"recover\", got {:?}",
            wire.kind
        )));
    }

    let jws = CompactJws::parse(&wire.signed_data)?;
    let payload_bytes = jws.decode_payload()?;
    let payload: RecoverSignedPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| SidetreeError::InvalidJws(format!("recover signed_data payload: {e}")))?;
    payload.recovery_key.validate()?;

    check_reveal_matches_key(&wire.reveal_value, &payload.recovery_key, config)?;

    let delta = try_parse_delta(wire.delta.clone(), config);

    Ok(ParsedRecover {
        suffix: Suffix(wire.did_suffix),
        jws: wire.signed_data,
        recovery_key: payload.recovery_key,
        recovery_commitment: payload.recovery_commitment,
        delta_hash: payload.delta_hash,
        delta,
    })
}

pub fn parse_deactivate(buffer: &[u8], config: &Config) -> SidetreeResult<ParsedDeactivate> {
    check_size(buffer, config)?;
    let wire: WireDeactivateRequest = serde_json::from_slice(buffer)
        .map_err(|e| SidetreeError::MalformedRequest(format!("deactivate request: {e}")))?;
    if wire.kind != "deactivate" {
        return Err(SidetreeError::MalformedRequest(format!(
            "expected type \"deactivate\", got {:?}",
            wire.kind
        )));
    }

    let jws = CompactJws::parse(&wire.signed_data)?;
    let payload_bytes = jws.decode_payload()?;
    let payload: DeactivateSignedPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| SidetreeError::InvalidJws(format!("deactivate signed_data payload: {e}")))?;
    payload.recovery_key.validate()?;

    check_reveal_matches_key(&wire.reveal_value, &payload.recovery_key, config)?;

    Ok(ParsedDeactivate {
        suffix: Suffix(wire.did_suffix),
        jws: wire.signed_data,
        recovery_key: payload.recovery_key,
    })
}
