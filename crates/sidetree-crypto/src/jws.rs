//! ─── Compact JWS verification ───────────────────────────────────────────────
//!
//! Only the flattened three-segment compact serialization is accepted; JSON
//! serialization JWS is out of scope. Signatures are the raw `r || s` (64
//! byte) encoding JOSE uses for ES256K, not a DER sequence.

use crate::jwk::Secp256k1PublicJwk;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use k256::ecdsa::signature::Verifier;
use k256::ecdsa::Signature;
use serde::Deserialize;
use sidetree_core::config::JWS_ALG_ES256K;
use sidetree_core::{Config, SidetreeError, SidetreeResult};

#[derive(Debug, Deserialize)]
struct ProtectedHeader {
    alg: String,
}

pub struct CompactJws<'a> {
    protected_b64: &'a str,
    payload_b64: &'a str,
    signature_b64: &'a str,
}

impl<'a> CompactJws<'a> {
    pub fn parse(jws: &'a str) -> SidetreeResult<Self> {
        let mut parts = jws.split('.');
        let (Some(protected_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SidetreeError::InvalidJws(
                "compact JWS must have exactly three segments".into(),
            ));
        };
        Ok(Self {
            protected_b64,
            payload_b64,
            signature_b64,
        })
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.protected_b64, self.payload_b64)
    }

    fn decode_protected(&self) -> SidetreeResult<ProtectedHeader> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.protected_b64)
            .map_err(|_| SidetreeError::InvalidJws("protected header is not base64url".into()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SidetreeError::InvalidJws(format!("protected header is not JSON: {e}")))
    }

    pub fn decode_payload(&self) -> SidetreeResult<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(self.payload_b64)
            .map_err(|_| SidetreeError::InvalidJws("payload is not base64url".into()))
    }

    fn decode_signature(&self) -> SidetreeResult<Signature> {
        let raw = URL_SAFE_NO_PAD
            .decode(self.signature_b64)
            .map_err(|_| SidetreeError::InvalidJws("signature is not base64url".into()))?;
        Signature::try_from(raw.as_slice())
            .map_err(|_| SidetreeError::InvalidJws("signature is not a valid r||s pair".into()))
    }
}

/// Verify `jws` against `jwk` and return the decoded payload bytes.
///
/// A mismatched `alg`, a malformed segment, or a failed signature check are
/// all reported as `SidetreeError::SignatureInvalid` — the caller treats
/// verification failure uniformly regardless of which step produced it,
/// per the no-op-on-cryptographic-failure processing rule.
pub fn verify(jws: &str, jwk: &Secp256k1PublicJwk, config: &Config) -> SidetreeResult<Vec<u8>> {
    let parsed = CompactJws::parse(jws)?;
    let header = parsed
        .decode_protected()
        .map_err(|_| SidetreeError::SignatureInvalid)?;
    if header.alg != JWS_ALG_ES256K || !config.is_supported_jws_algorithm(&header.alg) {
        return Err(SidetreeError::SignatureInvalid);
    }
    let verifying_key = jwk
        .to_verifying_key()
        .map_err(|_| SidetreeError::SignatureInvalid)?;
    let signature = parsed
        .decode_signature()
        .map_err(|_| SidetreeError::SignatureInvalid)?;
    verifying_key
        .verify(parsed.signing_input().as_bytes(), &signature)
        .map_err(|_| SidetreeError::SignatureInvalid)?;
    parsed
        .decode_payload()
        .map_err(|_| SidetreeError::SignatureInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::signature::Signer;
    use k256::ecdsa::SigningKey;
    use k256::elliptic_curve::sec1::ToEncodedPoint;

    fn signing_pair() -> (SigningKey, Secp256k1PublicJwk) {
        let signing = SigningKey::from_bytes(&[9u8; 32].into()).unwrap();
        let point = signing.verifying_key().to_encoded_point(false);
        let jwk = Secp256k1PublicJwk {
            kty: "EC".to_string(),
            crv: "secp256k1".to_string(),
            x: URL_SAFE_NO_PAD.encode(point.x().unwrap()),
            y: URL_SAFE_NO_PAD.encode(point.y().unwrap()),
        };
        (signing, jwk)
    }

    fn compact_jws(signing: &SigningKey, payload: &[u8]) -> String {
        let header = serde_json::json!({"alg": "ES256K"});
        let protected_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signing_input = format!("{protected_b64}.{payload_b64}");
        let signature: Signature = signing.sign(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
        format!("{protected_b64}.{payload_b64}.{signature_b64}")
    }

    #[test]
    fn valid_signature_verifies_and_returns_payload() {
        let (signing, jwk) = signing_pair();
        let config = Config::default();
        let jws = compact_jws(&signing, b"{\"hello\":\"world\"}");
        let payload = verify(&jws, &jwk, &config).unwrap();
        assert_eq!(payload, b"{\"hello\":\"world\"}");
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let (signing, jwk) = signing_pair();
        let config = Config::default();
        let jws = compact_jws(&signing, b"original");
        let mut parts: Vec<&str> = jws.split('.').collect();
        let tampered_payload = URL_SAFE_NO_PAD.encode(b"tampered");
        parts[1] = &tampered_payload;
        let tampered = parts.join(".");
        assert!(matches!(
            verify(&tampered, &jwk, &config),
            Err(SidetreeError::SignatureInvalid)
        ));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let (signing, _jwk) = signing_pair();
        let (_, other_jwk) = {
            let other = SigningKey::from_bytes(&[3u8; 32].into()).unwrap();
            let point = other.verifying_key().to_encoded_point(false);
            (
                other,
                Secp256k1PublicJwk {
                    kty: "EC".to_string(),
                    crv: "secp256k1".to_string(),
                    x: URL_SAFE_NO_PAD.encode(point.x().unwrap()),
                    y: URL_SAFE_NO_PAD.encode(point.y().unwrap()),
                },
            )
        };
        let config = Config::default();
        let jws = compact_jws(&signing, b"payload");
        assert!(matches!(
            verify(&jws, &other_jwk, &config),
            Err(SidetreeError::SignatureInvalid)
        ));
    }

    #[test]
    fn malformed_compact_form_is_rejected() {
        assert!(CompactJws::parse("only.two").is_err());
        assert!(CompactJws::parse("a.b.c.d").is_err());
    }
}
