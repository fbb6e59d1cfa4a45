//! JSON Canonicalization Scheme (RFC 8785) wrapper. Every hash that feeds
//! into a suffix or a commitment goes through here first, never through
//! `serde_json::to_string` directly — key order and number formatting must
//! be reproducible across implementations.

use serde::Serialize;
use sidetree_core::{SidetreeError, SidetreeResult};

pub fn canonicalize<T: Serialize>(object: &T) -> SidetreeResult<String> {
    serde_jcs::to_string(object)
        .map_err(|e| SidetreeError::MalformedRequest(format!("JCS canonicalization failed: {e}")))
}

pub fn canonicalize_to_bytes<T: Serialize>(object: &T) -> SidetreeResult<Vec<u8>> {
    canonicalize(object).map(String::into_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_is_normalized() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }
}
