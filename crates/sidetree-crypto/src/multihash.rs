//! ─── Multihash codec ────────────────────────────────────────────────────────
//!
//! An encoded multihash is `base64url(varint(algorithm_code) || varint(digest_len) || digest)`.
//! Both varints are single-byte for every algorithm code and digest length this
//! protocol instance uses, but the decoder still reads them as unsigned
//! varints so a future wider code doesn't silently corrupt the digest.

use crate::canon::canonicalize;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sha3::Sha3_256;
use sidetree_core::config::{SHA256_CODE, SHA3_256_CODE};
use sidetree_core::{Config, SidetreeError, SidetreeResult};
use subtle::ConstantTimeEq;

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn read_varint(bytes: &[u8]) -> Option<(u64, &[u8])> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Some((value, &bytes[i + 1..]));
        }
        shift += 7;
        if shift >= 64 {
            return None;
        }
    }
    None
}

fn digest_for(algorithm_code: u64, data: &[u8], config: &Config) -> SidetreeResult<Vec<u8>> {
    if !config.is_supported_hash_algorithm(algorithm_code) {
        return Err(SidetreeError::UnsupportedHashAlgorithm(algorithm_code));
    }
    match algorithm_code {
        SHA256_CODE => Ok(Sha256::digest(data).to_vec()),
        SHA3_256_CODE => Ok(Sha3_256::digest(data).to_vec()),
        other => Err(SidetreeError::UnsupportedHashAlgorithm(other)),
    }
}

/// Hash `data` under `algorithm_code` and return the base64url-encoded
/// multihash. `algorithm_code` must appear in `config.hash_algorithms`.
pub fn hash(data: &[u8], algorithm_code: u64, config: &Config) -> SidetreeResult<String> {
    let digest = digest_for(algorithm_code, data, config)?;
    let mut buf = Vec::with_capacity(digest.len() + 2);
    write_varint(algorithm_code, &mut buf);
    write_varint(digest.len() as u64, &mut buf);
    buf.extend_from_slice(&digest);
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

/// Decode `encoded_multihash`, re-hash `content` under the algorithm it
/// names, and compare in constant time. A structurally invalid multihash or
/// an algorithm code this instance doesn't support is simply a verification
/// failure, not an error — callers never need to branch on why a reveal
/// didn't check out.
pub fn verify_encoded_multihash(content: &[u8], encoded_multihash: &str, config: &Config) -> bool {
    let Ok(raw) = URL_SAFE_NO_PAD.decode(encoded_multihash) else {
        return false;
    };
    let Some((algorithm_code, rest)) = read_varint(&raw) else {
        return false;
    };
    let Some((len, digest)) = read_varint(rest) else {
        return false;
    };
    if digest.len() as u64 != len {
        return false;
    }
    match digest_for(algorithm_code, content, config) {
        Ok(expected) => expected.ct_eq(digest).into(),
        Err(_) => false,
    }
}

/// JCS-canonicalize `object`, then multihash the canonical bytes.
pub fn canonicalize_then_hash<T: Serialize>(
    object: &T,
    algorithm_code: u64,
    config: &Config,
) -> SidetreeResult<String> {
    let canonical = canonicalize(object)?;
    hash(canonical.as_bytes(), algorithm_code, config)
}

/// Commitment construction: `hash(hash(canonicalize(object)))`, encoded
/// under the latest algorithm. Used to turn a reveal-value JWK into the
/// commitment value published in the preceding operation's delta/suffixData.
pub fn canonicalize_then_double_hash_then_encode<T: Serialize>(
    object: &T,
    algorithm_code: u64,
    config: &Config,
) -> SidetreeResult<String> {
    let canonical = canonicalize(object)?;
    let inner = digest_for(algorithm_code, canonical.as_bytes(), config)?;
    hash(&inner, algorithm_code, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let config = Config::default();
        let data = b"hello sidetree";
        let encoded = hash(data, SHA256_CODE, &config).unwrap();
        assert!(verify_encoded_multihash(data, &encoded, &config));
        assert!(!verify_encoded_multihash(b"tampered", &encoded, &config));
    }

    #[test]
    fn unsupported_algorithm_rejected_at_hash_time() {
        let config = Config::default();
        let err = hash(b"x", 0x99, &config).unwrap_err();
        assert!(matches!(err, SidetreeError::UnsupportedHashAlgorithm(0x99)));
    }

    #[test]
    fn algorithm_outside_config_is_rejected_even_if_implemented() {
        let mut config = Config::default();
        config.hash_algorithms = vec![SHA256_CODE];
        let err = hash(b"x", SHA3_256_CODE, &config).unwrap_err();
        assert!(matches!(err, SidetreeError::UnsupportedHashAlgorithm(SHA3_256_CODE)));
    }

    #[test]
    fn malformed_multihash_fails_closed() {
        let config = Config::default();
        assert!(!verify_encoded_multihash(b"anything", "not-base64url!!", &config));
        assert!(!verify_encoded_multihash(b"anything", "", &config));
    }

    #[test]
    fn commitment_is_a_double_hash_of_the_canonicalized_jwk() {
        let config = Config::default();
        let jwk = serde_json::json!({"kty": "EC", "crv": "secp256k1", "x": "abc", "y": "def"});
        let commitment =
            canonicalize_then_double_hash_then_encode(&jwk, SHA256_CODE, &config).unwrap();
        let canonical = serde_jcs::to_string(&jwk).unwrap();
        let single = hash(canonical.as_bytes(), SHA256_CODE, &config).unwrap();
        // The commitment is a hash of a hash, not a hash of the canonical form directly.
        assert_ne!(commitment, single);
    }
}
