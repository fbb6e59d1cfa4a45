//! ─── JWK shape validation ───────────────────────────────────────────────────
//!
//! This protocol instance only recognizes secp256k1 public keys carried as
//! an EC JWK (`kty: "EC"`, `crv: "secp256k1"`). Validation here is purely
//! structural — whether the point actually decodes to a valid curve point is
//! checked lazily, the first time the key is used to verify a JWS.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};
use sidetree_core::{SidetreeError, SidetreeResult};

pub const EXPECTED_KTY: &str = "EC";
pub const EXPECTED_CRV: &str = "secp256k1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Secp256k1PublicJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl Secp256k1PublicJwk {
    /// Structural validation: required members present, `kty`/`crv` pinned
    /// to the one curve this instance supports, `x`/`y` decode as base64url
    /// to the expected 32-byte coordinate width.
    pub fn validate(&self) -> SidetreeResult<()> {
        if self.kty != EXPECTED_KTY {
            return Err(SidetreeError::InvalidJwk(format!(
                "unsupported kty: {}",
                self.kty
            )));
        }
        if self.crv != EXPECTED_CRV {
            return Err(SidetreeError::InvalidJwk(format!(
                "unsupported crv: {}",
                self.crv
            )));
        }
        let x = URL_SAFE_NO_PAD
            .decode(&self.x)
            .map_err(|_| SidetreeError::InvalidJwk("x is not valid base64url".into()))?;
        let y = URL_SAFE_NO_PAD
            .decode(&self.y)
            .map_err(|_| SidetreeError::InvalidJwk("y is not valid base64url".into()))?;
        if x.len() != 32 || y.len() != 32 {
            return Err(SidetreeError::InvalidJwk(
                "x and y must each be 32 bytes".into(),
            ));
        }
        Ok(())
    }

    /// Decode into a verifying key usable by the JWS module. Returns an
    /// error (rather than a panic) for coordinates that don't land on the
    /// curve — a structurally valid JWK can still fail this.
    pub fn to_verifying_key(&self) -> SidetreeResult<VerifyingKey> {
        self.validate()?;
        let x = URL_SAFE_NO_PAD.decode(&self.x).expect("validated above");
        let y = URL_SAFE_NO_PAD.decode(&self.y).expect("validated above");
        let mut uncompressed = Vec::with_capacity(65);
        uncompressed.push(0x04);
        uncompressed.extend_from_slice(&x);
        uncompressed.extend_from_slice(&y);
        VerifyingKey::from_sec1_bytes(&uncompressed)
            .map_err(|e| SidetreeError::InvalidJwk(format!("point not on curve: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jwk() -> Secp256k1PublicJwk {
        use k256::ecdsa::SigningKey;
        use k256::elliptic_curve::sec1::ToEncodedPoint;

        let signing = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let point = signing.verifying_key().to_encoded_point(false);
        let x = point.x().unwrap();
        let y = point.y().unwrap();
        Secp256k1PublicJwk {
            kty: EXPECTED_KTY.to_string(),
            crv: EXPECTED_CRV.to_string(),
            x: URL_SAFE_NO_PAD.encode(x),
            y: URL_SAFE_NO_PAD.encode(y),
        }
    }

    #[test]
    fn valid_secp256k1_jwk_passes_and_decodes() {
        let jwk = sample_jwk();
        assert!(jwk.validate().is_ok());
        assert!(jwk.to_verifying_key().is_ok());
    }

    #[test]
    fn wrong_curve_is_rejected() {
        let mut jwk = sample_jwk();
        jwk.crv = "P-256".to_string();
        assert!(matches!(jwk.validate(), Err(SidetreeError::InvalidJwk(_))));
    }

    #[test]
    fn short_coordinate_is_rejected() {
        let mut jwk = sample_jwk();
        jwk.x = URL_SAFE_NO_PAD.encode([1u8; 16]);
        assert!(matches!(jwk.validate(), Err(SidetreeError::InvalidJwk(_))));
    }
}
