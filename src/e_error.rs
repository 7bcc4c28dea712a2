use std::path::PathBuf;

use thiserror::Error;

pub type QfResult<T> = Result<T, QfError>;

/// Everything that turns an invocation into an empty quickfix list with a
/// reason. The display string is what the editor shows.
#[derive(Debug, Error)]
pub enum QfError {
    #[error("Can't find {marker}, is this a {tool} project?")]
    MarkerNotFound { marker: &'static str, tool: &'static str },

    #[error("No such command: `{0}`")]
    UnknownCommand(String),

    #[error("`{program}` produced no parseable output, is it installed?")]
    NoToolOutput { program: String },

    #[error("Malformed `{reason}` record on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        reason: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Can't parse test output: {block}")]
    TestBlock { block: String },

    #[error("Failed to run `{program}` in {}: {source}", .dir.display())]
    Spawn {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
