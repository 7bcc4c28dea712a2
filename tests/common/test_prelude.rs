// common/test_prelude.rs

// Re-export commonly used items for integration tests.
pub use assert_cmd::Command;
pub use predicates::prelude::*;
pub use predicates::str::contains;
pub use serde_json::{json, Value};

/// Parses the single envelope `cargo-qf` writes to stdout.
pub fn envelope(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("stdout should be one JSON object")
}
