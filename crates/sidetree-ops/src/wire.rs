//! ─── Wire shapes ────────────────────────────────────────────────────────────
//!
//! The untyped JSON the client actually sends. `deny_unknown_fields` on every
//! struct here is what gives parsers their "unknown fields fail" strictness —
//! nothing downstream re-checks property count.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WireSuffixData {
    pub delta_hash: String,
    pub recovery_commitment: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WireCreateRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub suffix_data: WireSuffixData,
    #[serde(default)]
    pub delta: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WireUpdateRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub did_suffix: String,
    pub reveal_value: String,
    pub signed_data: String,
    #[serde(default)]
    pub delta: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WireRecoverRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub did_suffix: String,
    pub reveal_value: String,
    pub signed_data: String,
    #[serde(default)]
    pub delta: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WireDeactivateRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub did_suffix: String,
    pub reveal_value: String,
    pub signed_data: String,
}

/// The JCS-canonicalized payload carried inside an Update JWS.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateSignedPayload {
    pub update_key: sidetree_crypto::Secp256k1PublicJwk,
    pub delta_hash: String,
}

/// The JCS-canonicalized payload carried inside a Recover JWS.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RecoverSignedPayload {
    pub recovery_key: sidetree_crypto::Secp256k1PublicJwk,
    pub recovery_commitment: String,
    pub delta_hash: String,
}

/// The JCS-canonicalized payload carried inside a Deactivate JWS.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DeactivateSignedPayload {
    pub recovery_key: sidetree_crypto::Secp256k1PublicJwk,
}
