#![doc = include_str!("../README.md")]

// Re-export std common modules
pub mod prelude {
    pub use std::env;
    pub use std::io;
    pub use std::path::{Path, PathBuf};
    pub use std::process::Command;
    pub use std::process::Stdio;
    pub use log::{debug, trace};
}

pub mod e_paths;
pub use e_paths::{resolve, PathContext};
pub mod e_diagnostic;
pub use e_diagnostic::{dedupe, Diagnostic, DiagnosticBuilder, DiagnosticSet, QuickfixEntry, Severity};
pub mod e_error;
pub use e_error::{QfError, QfResult};
pub mod e_messages;
pub mod e_build_parser;
pub use e_build_parser::parse_build_output;
pub mod e_test_parser;
pub use e_test_parser::parse_test_output;
pub mod e_bazel_parser;
pub use e_bazel_parser::parse_bazel_output;
pub mod e_manifest;
pub use e_manifest::{find_project_root, find_workspace_root, ProjectProbe, RealProbe};
pub mod e_runner;
pub use e_runner::{ProcessRunner, ToolInvocation, ToolRunner};
pub mod e_dispatch;
pub use e_dispatch::{run, Envelope, Request, Tool};
pub mod e_cli;
pub use e_cli::Cli;
