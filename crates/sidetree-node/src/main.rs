//! sidetree-resolve — resolves a DID's current state from a fixture of
//! anchored operations.
//!
//! Startup sequence:
//!   1. Parse CLI arguments and initialize tracing.
//!   2. Load the anchored-operation fixture into an in-memory operation store.
//!   3. Resolve the requested DID (short or long form) against that store.
//!   4. Print the resulting DID document, or report that none was found.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use sidetree_core::{AnchoredOperation, Config, OperationKind, Suffix};
use sidetree_store::{InMemoryOperationStore, OperationStore};

#[derive(Parser, Debug)]
#[command(
    name = "sidetree-resolve",
    version,
    about = "Resolve a Sidetree DID from a fixture of anchored operations"
)]
struct Args {
    /// Path to a JSON file containing an array of anchored operations.
    #[arg(long)]
    ops_file: PathBuf,

    /// DID to resolve — short form `did:<method>:<suffix>` or long form
    /// `did:<method>:<suffix>?-<method>-initial-state=<encoded create request>`.
    did: String,

    /// Passed straight to `tracing-subscriber`'s `EnvFilter`.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// One entry in the ops-file fixture. `operation_buffer` is the raw
/// operation request as JSON — re-serialized to bytes before anything
/// downstream sees it, exactly as a client-authored buffer would arrive.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureOperation {
    suffix: String,
    kind: OperationKind,
    transaction_number: u64,
    #[serde(default)]
    transaction_time: u64,
    #[serde(default)]
    operation_index: u32,
    operation_buffer: serde_json::Value,
}

impl FixtureOperation {
    fn into_anchored(self) -> anyhow::Result<AnchoredOperation> {
        let operation_buffer = serde_json::to_vec(&self.operation_buffer)
            .context("re-serializing fixture operation_buffer")?;
        Ok(AnchoredOperation {
            suffix: Suffix(self.suffix),
            kind: self.kind,
            transaction_number: self.transaction_number,
            transaction_time: self.transaction_time,
            operation_index: self.operation_index,
            operation_buffer,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap()),
        )
        .init();

    info!(ops_file = %args.ops_file.display(), did = %args.did, "sidetree-resolve starting");

    let fixture_json = std::fs::read_to_string(&args.ops_file)
        .with_context(|| format!("reading ops file {}", args.ops_file.display()))?;
    let fixture: Vec<FixtureOperation> =
        serde_json::from_str(&fixture_json).context("parsing ops file as a JSON array of operations")?;

    let ops = fixture
        .into_iter()
        .map(FixtureOperation::into_anchored)
        .collect::<anyhow::Result<Vec<_>>>()?;
    info!(count = ops.len(), "loaded anchored operations");

    let store = InMemoryOperationStore::new();
    store.insert_or_replace(ops).await.context("loading fixture into the operation store")?;

    let config = Config::default();
    let resolved = if args.did.contains('?') {
        sidetree_resolver::resolve_long_form(&args.did, &store, &config)
            .await
            .context("resolving long-form DID")?
    } else {
        let suffix = short_form_suffix(&args.did)?;
        sidetree_resolver::resolve(&suffix, &store, &config)
            .await
            .context("resolving DID")?
    };

    match resolved {
        Some(state) => {
            let view = sidetree_ops::to_document_view(&args.did, &state.document);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        None => {
            warn!(did = %args.did, "no effective Create found for this DID");
            println!("null");
        }
    }

    Ok(())
}

/// Extract the suffix from a short-form `did:<method>:<suffix>` identifier.
fn short_form_suffix(did: &str) -> anyhow::Result<Suffix> {
    let suffix = did
        .rsplit(':')
        .next()
        .filter(|segment| !segment.is_empty())
        .with_context(|| format!("'{did}' is not a well-formed DID"))?;
    Ok(Suffix(suffix.to_string()))
}
