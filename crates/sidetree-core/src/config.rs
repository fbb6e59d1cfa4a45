//! ─── Protocol configuration ─────────────────────────────────────────────────
//!
//! Every size limit, supported algorithm, and purpose vocabulary is threaded
//! explicitly through `Config` rather than read from module-level globals —
//! parsers, the processor, and the resolver all take a `&Config` parameter.

use serde::{Deserialize, Serialize};

/// Multihash algorithm code for SHA2-256, the protocol default.
pub const SHA256_CODE: u64 = 0x12;

/// Multihash algorithm code for SHA3-256.
pub const SHA3_256_CODE: u64 = 0x16;

/// The only JWS algorithm this protocol instance recognizes by default.
pub const JWS_ALG_ES256K: &str = "ES256K";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Maximum size of an operation request buffer, in bytes.
    pub max_operation_size: usize,

    /// Maximum size of a canonicalized delta, in bytes.
    pub max_delta_size: usize,

    /// Maximum number of patches per delta.
    pub max_patches: usize,

    /// Maximum public keys a document may carry.
    pub max_public_keys: usize,

    /// Maximum services a document may carry.
    pub max_services: usize,

    /// Multihash algorithm codes this protocol instance accepts when
    /// verifying a previously-encoded multihash.
    pub hash_algorithms: Vec<u64>,

    /// The algorithm code used when computing *new* multihashes.
    pub latest_hash_algorithm: u64,

    /// JWS `alg` header values accepted for signed operations.
    pub jws_algorithms: Vec<String>,

    /// Recognized public key purposes.
    pub known_key_purposes: Vec<String>,

    /// Recognized public key types.
    pub known_key_types: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_operation_size: 2_000,
            max_delta_size: 1_000,
            max_patches: 10,
            max_public_keys: 10,
            max_services: 10,
            hash_algorithms: vec![SHA256_CODE, SHA3_256_CODE],
            latest_hash_algorithm: SHA256_CODE,
            jws_algorithms: vec![JWS_ALG_ES256K.to_string()],
            known_key_purposes: vec![
                "authentication".to_string(),
                "assertionMethod".to_string(),
                "keyAgreement".to_string(),
                "capabilityInvocation".to_string(),
                "capabilityDelegation".to_string(),
            ],
            known_key_types: vec![
                "EcdsaSecp256k1VerificationKey2019".to_string(),
                "JsonWebKey2020".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn is_supported_hash_algorithm(&self, code: u64) -> bool {
        self.hash_algorithms.contains(&code)
    }

    pub fn is_supported_jws_algorithm(&self, alg: &str) -> bool {
        self.jws_algorithms.iter().any(|a| a == alg)
    }

    pub fn is_known_key_type(&self, key_type: &str) -> bool {
        self.known_key_types.iter().any(|t| t == key_type)
    }

    pub fn is_known_purpose(&self, purpose: &str) -> bool {
        self.known_key_purposes.iter().any(|p| p == purpose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_accepts_latest_algorithm() {
        let cfg = Config::default();
        assert!(cfg.is_supported_hash_algorithm(cfg.latest_hash_algorithm));
    }

    #[test]
    fn default_config_accepts_es256k() {
        let cfg = Config::default();
        assert!(cfg.is_supported_jws_algorithm(JWS_ALG_ES256K));
        assert!(!cfg.is_supported_jws_algorithm("HS256"));
    }
}
