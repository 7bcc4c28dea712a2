// src/e_bazel_parser.rs
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::e_diagnostic::{Diagnostic, DiagnosticSet, Severity};
use crate::e_paths::PathContext;

// error[E0425]: cannot find value `x` in this scope
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<level>error|warning)(\[(?P<code>[A-Za-z0-9_-]+)\])?:\s+(?P<msg>.+)$")
        .expect("Invalid regex")
});

//  --> src/main.rs:209:23
static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-->\s+(?P<file>.+?):(?P<line>\d+):(?P<col>\d+)\s*$").expect("Invalid regex")
});

/// A header waiting for its `-->` line.
#[derive(Debug)]
struct Pending {
    severity: Severity,
    message: String,
}

/// Parses rustc's human-readable diagnostics as relayed by bazel.
///
/// A diagnostic is an `error:`/`warning:` header followed by a `-->` location.
/// Snippet lines, notes and bazel's own progress output in between are
/// ignored, and headers that never get a location (`error: aborting due to
/// previous error`) are dropped.
pub fn parse_bazel_output(output: &str, paths: &PathContext) -> DiagnosticSet {
    let mut set = DiagnosticSet::new();
    let mut pending: Option<Pending> = None;

    for line in output.lines() {
        if let Some(caps) = HEADER.captures(line) {
            if let Some(dropped) = pending.take() {
                trace!("no location for {:?}", dropped);
            }
            pending = Some(Pending {
                severity: Severity::from_level(&caps["level"]),
                message: caps["msg"].trim().to_string(),
            });
            continue;
        }
        let Some(caps) = LOCATION.captures(line) else {
            continue;
        };
        let Some(header) = pending.take() else {
            // secondary `-->` of an already located diagnostic
            continue;
        };
        // Both are \d+ so parsing only fails on overflow.
        let (Ok(line_no), Ok(column)) = (caps["line"].parse(), caps["col"].parse()) else {
            trace!("location out of range: {}", line);
            continue;
        };
        set.push(
            Diagnostic::builder()
                .text(header.message)
                .filename(paths.resolve(&caps["file"]))
                .line(line_no)
                .column(column)
                .severity(header.severity)
                .build(),
        );
    }

    debug!(
        "bazel output: {} errors, {} warnings",
        set.errors.len(),
        set.warnings.len()
    );
    set
}
