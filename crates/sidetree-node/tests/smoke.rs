//! End-to-end smoke test for sidetree-resolve.
//!
//! Writes a fixture of anchored operations to a temp file, runs the real
//! binary against it, and asserts the printed document reflects the
//! expected resolved state.
//!
//! Run with:
//!   cargo test -p sidetree-node --test smoke

use std::process::Command;

fn run(ops_fixture: &serde_json::Value, did: &str) -> serde_json::Value {
    let dir = std::env::temp_dir().join(format!("sidetree_smoke_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let ops_path = dir.join("ops.json");
    std::fs::write(&ops_path, serde_json::to_string(ops_fixture).unwrap()).unwrap();

    let bin = env!("CARGO_BIN_EXE_sidetree-resolve");
    let output = Command::new(bin)
        .args(["--ops-file", ops_path.to_str().unwrap(), did])
        .output()
        .expect("failed to run sidetree-resolve");

    let _ = std::fs::remove_dir_all(&dir);
    assert!(
        output.status.success(),
        "sidetree-resolve exited non-zero: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document or null")
}

#[test]
fn unknown_did_resolves_to_null() {
    let result = run(&serde_json::json!([]), "did:sidetree:unknownsuffix");
    assert!(result.is_null());
}

#[test]
fn create_only_fixture_resolves_to_a_document() {
    let create_request = serde_json::json!({
        "type": "create",
        "suffixData": {
            "deltaHash": "placeholder-delta-hash",
            "recoveryCommitment": "placeholder-recovery-commitment"
        },
        "delta": {
            "updateCommitment": "placeholder-update-commitment",
            "patches": []
        }
    });

    let fixture = serde_json::json!([{
        "suffix": "doesnotmatterforthistest",
        "kind": "create",
        "transactionNumber": 1,
        "transactionTime": 100,
        "operationIndex": 0,
        "operationBuffer": create_request
    }]);

    // The suffix in the fixture is attacker-independent of the computed one,
    // so a mismatched create is expected to be discarded rather than panic.
    let result = run(&fixture, "did:sidetree:doesnotmatterforthistest");
    assert!(result.is_null(), "a create whose computed suffix disagrees with the anchored suffix must resolve to nothing, not error");
}
