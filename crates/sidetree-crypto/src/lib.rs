pub mod canon;
pub mod jwk;
pub mod jws;
pub mod multihash;

pub use canon::{canonicalize, canonicalize_to_bytes};
pub use jwk::Secp256k1PublicJwk;
pub use jws::CompactJws;
pub use multihash::{
    canonicalize_then_double_hash_then_encode, canonicalize_then_hash, hash,
    verify_encoded_multihash,
};
