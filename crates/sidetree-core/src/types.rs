use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Ledger-assigned position of an anchored operation, 1-indexed.
pub type TransactionNumber = u64;

/// Ledger timestamp (seconds, UTC) carried alongside a transaction number.
pub type TransactionTime = u64;

/// Position of an operation within the batch file anchored at a transaction.
pub type OperationIndex = u32;

// ── Suffix ───────────────────────────────────────────────────────────────────

/// The DID unique suffix: the encoded multihash of a Create request's
/// canonicalized `suffixData`. Assigned once at Create time and never
/// changes; the sole identity anchor for a DID's operation stream.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Suffix(pub String);

impl Suffix {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Suffix({})", self.0)
    }
}

// ── OperationKind ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Recover,
    Deactivate,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Recover => "recover",
            OperationKind::Deactivate => "deactivate",
        };
        write!(f, "{s}")
    }
}

// ── AnchoredOperation ─────────────────────────────────────────────────────────

/// An operation whose position in the ledger has been assigned.
///
/// Ordering across anchored operations is the lexicographic order of
/// `(transaction_number, operation_index)` — total and ledger-derived.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchoredOperation {
    pub suffix: Suffix,
    pub kind: OperationKind,
    pub transaction_number: TransactionNumber,
    pub transaction_time: TransactionTime,
    pub operation_index: OperationIndex,
    /// The exact bytes authored by the client. Re-parsed on demand; never
    /// interpreted by the store or the resolver's bucketing step.
    pub operation_buffer: Vec<u8>,
}

impl AnchoredOperation {
    /// The natural ordering key used everywhere an anchored operation must
    /// be placed relative to its peers.
    pub fn order_key(&self) -> (TransactionNumber, OperationIndex) {
        (self.transaction_number, self.operation_index)
    }
}

impl PartialEq for AnchoredOperation {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}
impl Eq for AnchoredOperation {}

impl PartialOrd for AnchoredOperation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnchoredOperation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

// ── Document model ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PublicKeyEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub purposes: Vec<String>,
    /// The key material itself (JWK or legacy verification-key shape). Not
    /// interpreted further by the document composer — only carried and
    /// compared by `id`.
    pub public_key_jwk: serde_json::Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: serde_json::Value,
}

/// The internal DID document model that patches mutate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Document {
    pub public_keys: Vec<PublicKeyEntry>,
    pub services: Vec<ServiceEntry>,
}

impl Document {
    pub fn empty() -> Self {
        Self::default()
    }
}

// ── Patches ───────────────────────────────────────────────────────────────────

/// A single document patch. The action set is closed — see the document
/// composer's effect table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Patch {
    Replace {
        document: Document,
    },
    #[serde(rename_all = "camelCase")]
    AddPublicKeys {
        public_keys: Vec<PublicKeyEntry>,
    },
    RemovePublicKeys {
        ids: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    AddServices {
        services: Vec<ServiceEntry>,
    },
    RemoveServices {
        ids: Vec<String>,
    },
}

/// The patches + next-update-commitment block referenced from Create,
/// Update, and Recover by its hash.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Delta {
    pub patches: Vec<Patch>,
    pub update_commitment: String,
}

// ── DID state ─────────────────────────────────────────────────────────────────

/// The authoritative state produced by replaying operations for one suffix.
/// `None` on either commitment indicates the DID is deactivated along that
/// axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DidState {
    pub document: Document,
    pub next_recovery_commitment: Option<String>,
    pub next_update_commitment: Option<String>,
    pub last_operation_transaction_number: TransactionNumber,
}

impl DidState {
    /// A DID is deactivated once its recovery axis has been consumed with
    /// no successor commitment.
    pub fn is_deactivated(&self) -> bool {
        self.next_recovery_commitment.is_none()
    }
}
