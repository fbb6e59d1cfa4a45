use thiserror::Error;

/// Closed error enum for the resolver core. Per the propagation policy,
/// most of these never reach a caller — the processor and parsers
/// swallow them into a no-op return and (at the call site) log them.
/// Only store I/O and a fatal quantile sequence violation are meant to be
/// raised.
#[derive(Debug, Error)]
pub enum SidetreeError {
    // ── Malformed input ──────────────────────────────────────────────────────
    #[error("malformed operation request: {0}")]
    MalformedRequest(String),

    #[error("unknown property in strict-mode object: {0}")]
    UnknownProperty(String),

    #[error("missing required property: {0}")]
    MissingProperty(String),

    #[error("operation buffer exceeds maximum size of {max} bytes")]
    OperationTooLarge { max: usize },

    #[error("delta exceeds maximum size of {max} bytes")]
    DeltaTooLarge { max: usize },

    #[error("invalid base64url encoding in field: {0}")]
    InvalidBase64Url(String),

    #[error("invalid multihash encoding in field: {0}")]
    InvalidMultihash(String),

    #[error("unsupported multihash algorithm code: {0}")]
    UnsupportedHashAlgorithm(u64),

    #[error("too many patches: maximum {max} per delta")]
    TooManyPatches { max: usize },

    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    #[error("invalid JWK shape: {0}")]
    InvalidJwk(String),

    #[error("invalid compact JWS: {0}")]
    InvalidJws(String),

    // ── Cryptographic failure (never propagated — processor returns no-op) ──
    #[error("hash commitment mismatch")]
    CommitmentMismatch,

    #[error("JWS signature verification failed")]
    SignatureInvalid,

    #[error("reveal value does not match the expected commitment")]
    RevealMismatch,

    // ── Precondition failure ────────────────────────────────────────────────
    #[error("create operation targets an already-initialized suffix")]
    DidAlreadyCreated,

    #[error("operation targets an uninitialized or deactivated suffix")]
    NoCurrentState,

    #[error("sliding window group id {got} is not sequential (expected {expected})")]
    NonSequentialGroupId { expected: i64, got: i64 },

    // ── Storage ──────────────────────────────────────────────────────────────
    #[error("operation store error: {0}")]
    Store(String),

    #[error("quantile store error: {0}")]
    QuantileStore(String),

    // ── Run-length codec ─────────────────────────────────────────────────────
    #[error("run-length encoded input has odd length")]
    OddLengthRunLength,

    #[error("{0}")]
    Other(String),
}

pub type SidetreeResult<T> = Result<T, SidetreeError>;
