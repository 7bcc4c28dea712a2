//! # cargo-qf
//!
//! `cargo-qf` runs `cargo` (or `bazel`) for the file open in your editor and
//! prints one JSON object your editor can load into its quickfix list.
//!
//! ## Quick Start
//! ```sh
//! cargo install cargo-qf
//! cargo qf build src/main.rs "$PWD"
//! ```

use std::env;
use std::io::Write;

use anyhow::Context;
use cargo_qf::{run, Cli, ProcessRunner, RealProbe};

pub fn main() -> anyhow::Result<()> {
    // stdout belongs to the editor; logs go to stderr and are off by default.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let envelope = match Cli::parse_args(env::args()) {
        Ok(cli) => {
            log::debug!("CLI options: {:?}", cli);
            run(&cli.into_request(), &RealProbe, &ProcessRunner)
        }
        Err(e) => match Cli::usage_failure(&e) {
            Some(envelope) => envelope,
            None => e.exit(),
        },
    };
    let json = serde_json::to_string(&envelope).context("serializing quickfix envelope")?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(json.as_bytes())
        .context("writing quickfix envelope")?;
    stdout.flush().context("flushing stdout")?;
    Ok(())
}
