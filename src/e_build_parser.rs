// src/e_build_parser.rs
use log::{debug, trace};
use serde_json::Value;

use crate::e_diagnostic::{Diagnostic, DiagnosticSet, Severity};
use crate::e_error::{QfError, QfResult};
use crate::e_messages::{CargoRecord, CompilerMessage};
use crate::e_paths::PathContext;

/// Text of the warning added when cargo reused every artifact.
pub const FRESH_BUILD_WARNING: &str = "`cargo` skipped build since there were no changes since last build. To force rebuild, update the timestamp on a file (e.g. :w).";

/// Parses the stdout of `cargo <cmd> --message-format=json`.
///
/// Lines that are not JSON objects are skipped, as are records whose `reason`
/// is neither `compiler-artifact` nor `compiler-message`. Every span of every
/// compiler message becomes one diagnostic, in stream order.
///
/// `program` only feeds the error raised when nothing in `output` was a cargo
/// record.
pub fn parse_build_output(
    output: &str,
    paths: &PathContext,
    program: &str,
) -> QfResult<DiagnosticSet> {
    let mut set = DiagnosticSet::new();
    let mut records_seen = 0usize;
    let mut artifacts_seen = 0usize;
    let mut rebuilt = false;

    for (index, line) in output.lines().enumerate() {
        let Some(record) = decode_line(line, index + 1)? else {
            continue;
        };
        records_seen += 1;
        match record {
            CargoRecord::CompilerArtifact(artifact) => {
                artifacts_seen += 1;
                if !artifact.fresh {
                    trace!("rebuilt {:?}", artifact.package_id);
                    rebuilt = true;
                }
            }
            CargoRecord::CompilerMessage(message) => {
                for diagnostic in diagnostics_from_message(&message, paths) {
                    set.push(diagnostic);
                }
            }
            CargoRecord::Other => {}
        }
    }

    if records_seen == 0 {
        return Err(QfError::NoToolOutput {
            program: program.to_string(),
        });
    }

    if artifacts_seen > 0 && !rebuilt {
        debug!("all {} artifacts were fresh", artifacts_seen);
        set.push(
            Diagnostic::builder()
                .text(FRESH_BUILD_WARNING)
                .severity(Severity::Warning)
                .build(),
        );
    }

    debug!(
        "json stream: {} records, {} errors, {} warnings",
        records_seen,
        set.errors.len(),
        set.warnings.len()
    );
    Ok(set)
}

/// Decodes one line. `Ok(None)` means the line is noise.
fn decode_line(line: &str, line_number: usize) -> QfResult<Option<CargoRecord>> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return Ok(None);
    }
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            trace!("skipping line {}: {}", line_number, e);
            return Ok(None);
        }
    };
    let reason = match value.get("reason").and_then(Value::as_str) {
        Some(reason) => reason.to_string(),
        None => {
            trace!("skipping line {}: no reason", line_number);
            return Ok(None);
        }
    };
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| QfError::MalformedRecord {
            line: line_number,
            reason,
            source,
        })
}

fn diagnostics_from_message(
    message: &CompilerMessage,
    paths: &PathContext,
) -> Vec<Diagnostic> {
    let diagnostic = &message.message;
    let severity = Severity::from_level(&diagnostic.level);
    diagnostic
        .spans
        .iter()
        .map(|span| {
            let location = span.real_location();
            let filename = if location.is_virtual() {
                paths.resolve_verbatim(&location.file_name)
            } else {
                paths.resolve(&location.file_name)
            };
            // Warnings usually carry no span label, only the top-level message.
            let text = match span.label.as_deref() {
                Some(label) if !label.is_empty() => label,
                _ => diagnostic.message.as_str(),
            };
            Diagnostic::builder()
                .filename(filename)
                .line(location.line_start)
                .column(location.column_start)
                .text(text)
                .severity(severity)
                .build()
        })
        .collect()
}
