// src/e_test_parser.rs
//
// `cargo test` ignores --message-format=json for the test binaries themselves
// (rust-lang/cargo#1403), so failing tests have to be read from plain text.
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::e_diagnostic::{Diagnostic, Severity};
use crate::e_error::{QfError, QfResult};
use crate::e_paths::PathContext;

// ---- tests::adds stdout ----
// ---- src/lib.rs - add (line 3) stdout ----
static BLOCK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^---- (?P<test>.+) (?P<tag>\S+) ----$").expect("Invalid regex"));

// thread 'x' panicked at 'message', src/lib.rs:7:5
static QUOTED_PANIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"panicked at '(?P<msg>.*)', (?P<file>[^:]*):(?P<line>\d+)(?::(?P<col>\d+))?")
        .expect("Invalid regex")
});

// thread 'x' panicked at src/lib.rs:7:5:
// message
static LOCATED_PANIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"panicked at (?P<file>.+?):(?P<line>\d+):(?P<col>\d+):?\s*(?P<msg>.*)$")
        .expect("Invalid regex")
});

/// Scanner state while walking the test output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    Idle,
    Accumulating(Vec<String>),
}

impl ScanState {
    /// Feeds one trimmed line. Returns the next state and, when a new header
    /// closes the current block, the finished block.
    fn step(self, line: &str) -> (ScanState, Option<Vec<String>>) {
        let header = line.starts_with("----");
        match (self, header) {
            (ScanState::Idle, true) => (ScanState::Accumulating(vec![line.to_string()]), None),
            (ScanState::Idle, false) => (ScanState::Idle, None),
            (ScanState::Accumulating(block), true) => {
                (ScanState::Accumulating(vec![line.to_string()]), Some(block))
            }
            (ScanState::Accumulating(mut block), false) => {
                block.push(line.to_string());
                (ScanState::Accumulating(block), None)
            }
        }
    }

    fn finish(self) -> Option<Vec<String>> {
        match self {
            ScanState::Idle => None,
            ScanState::Accumulating(block) => Some(block),
        }
    }
}

/// Parses the `---- <test> stdout ----` failure blocks of `cargo test`.
///
/// Every block must contain a panic location; a block that does not is an
/// error rather than a silently missing entry.
pub fn parse_test_output(output: &str, paths: &PathContext) -> QfResult<Vec<Diagnostic>> {
    let mut state = ScanState::Idle;
    let mut messages = Vec::new();
    for line in output.lines().map(str::trim) {
        let (next, finished) = state.step(line);
        state = next;
        if let Some(block) = finished {
            messages.push(finalize_block(&block, paths)?);
        }
    }
    if let Some(block) = state.finish() {
        messages.push(finalize_block(&block, paths)?);
    }
    debug!("test output: {} failing tests", messages.len());
    Ok(messages)
}

/// Turns one accumulated block into a diagnostic.
fn finalize_block(block: &[String], paths: &PathContext) -> QfResult<Diagnostic> {
    let joined = block.join(" ");
    let mismatch = || QfError::TestBlock {
        block: joined.clone(),
    };
    trace!("test block: {}", joined);

    let header = block.first().ok_or_else(mismatch)?;
    let test = BLOCK_HEADER
        .captures(header)
        .map(|caps| caps["test"].to_string())
        .ok_or_else(mismatch)?;

    let (index, panic_line) = block
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.contains("panicked at "))
        .ok_or_else(mismatch)?;

    let quoted = panic_line
        .split_once("panicked at ")
        .is_some_and(|(_, rest)| rest.starts_with('\''));

    let panic = if quoted {
        let caps = QUOTED_PANIC.captures(&joined).ok_or_else(mismatch)?;
        PanicSite {
            message: caps["msg"].to_string(),
            file: caps["file"].to_string(),
            line: caps["line"].parse().map_err(|_| mismatch())?,
            column: match caps.name("col") {
                Some(col) => col.as_str().parse().map_err(|_| mismatch())?,
                None => 0,
            },
        }
    } else {
        let caps = LOCATED_PANIC.captures(panic_line).ok_or_else(mismatch)?;
        let inline = caps["msg"].trim();
        let message = if inline.is_empty() {
            following_message(&block[index + 1..])
        } else {
            inline.to_string()
        };
        PanicSite {
            message,
            file: caps["file"].to_string(),
            line: caps["line"].parse().map_err(|_| mismatch())?,
            column: caps["col"].parse().map_err(|_| mismatch())?,
        }
    };

    Ok(Diagnostic::builder()
        .text(format!("{} {}", test, panic.message).trim_end())
        .filename(paths.resolve(&panic.file))
        .line(panic.line)
        .column(panic.column)
        .severity(Severity::Error)
        .build())
}

struct PanicSite {
    message: String,
    file: String,
    line: usize,
    column: usize,
}

/// The panic payload printed under the location line, up to the first blank
/// line or `note:`.
fn following_message(lines: &[String]) -> String {
    lines
        .iter()
        .take_while(|line| !line.is_empty() && !line.starts_with("note:"))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
