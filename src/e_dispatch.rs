//! Ties root discovery, the tool run and the parsers together into the one
//! envelope the editor receives.
//!
//! [`run`] never touches the filesystem or spawns anything itself; both go
//! through the [`ProjectProbe`] and [`ToolRunner`] it is given.

use std::path::PathBuf;

use log::debug;
use serde::Serialize;

use crate::e_bazel_parser::parse_bazel_output;
use crate::e_build_parser::parse_build_output;
use crate::e_diagnostic::{Diagnostic, DiagnosticSet, QuickfixEntry};
use crate::e_error::{QfError, QfResult};
use crate::e_manifest::{find_project_root, find_workspace_root, ProjectProbe};
use crate::e_paths::PathContext;
use crate::e_runner::{ToolInvocation, ToolRunner};
use crate::e_test_parser::parse_test_output;

/// The build tool whose output is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Tool {
    Cargo,
    Bazel,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Cargo => "cargo",
            Tool::Bazel => "bazel",
        }
    }

    /// Files that mark the project root, in the order they are reported.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Tool::Cargo => &["Cargo.toml"],
            Tool::Bazel => &["WORKSPACE", "WORKSPACE.bazel", "MODULE.bazel"],
        }
    }

    fn marker_error(&self) -> QfError {
        QfError::MarkerNotFound {
            marker: self.markers()[0],
            tool: self.name(),
        }
    }
}

/// What a subcommand's output looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subcommand {
    /// cargo JSON stream or bazel build log only.
    Build,
    /// Build output first, failing test blocks when the build was clean.
    Test,
}

impl Subcommand {
    fn parse(tool: Tool, command: &str) -> QfResult<Self> {
        match (tool, command) {
            (Tool::Cargo, "build" | "check" | "clippy") | (Tool::Bazel, "build") => {
                Ok(Subcommand::Build)
            }
            (_, "test") => Ok(Subcommand::Test),
            _ => Err(QfError::UnknownCommand(command.to_string())),
        }
    }
}

/// One editor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub tool: Tool,
    pub command: String,
    /// The buffer the editor was looking at; root discovery starts next to it.
    pub file: Option<PathBuf>,
    /// The editor's working directory; quickfix paths are relative to it.
    pub cwd: Option<PathBuf>,
    /// bazel target pattern.
    pub target: String,
    /// Overrides the tool program name.
    pub program: Option<String>,
}

impl Request {
    pub fn new(tool: Tool, command: impl Into<String>) -> Self {
        Request {
            tool,
            command: command.into(),
            file: None,
            cwd: None,
            target: "//...".to_string(),
            program: None,
        }
    }

    fn label(&self) -> String {
        format!("`{} {}`", self.tool.name(), self.command)
    }

    fn program(&self) -> String {
        self.program
            .clone()
            .unwrap_or_else(|| self.tool.name().to_string())
    }
}

/// The single JSON object written back to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub message: String,
    pub quickfix: Vec<QuickfixEntry>,
}

impl Envelope {
    /// An envelope carrying only a reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        Envelope {
            message: reason.into(),
            quickfix: Vec::new(),
        }
    }

    /// Errors win over warnings; warnings are only shown on a clean build.
    pub fn summarize(label: &str, set: DiagnosticSet) -> Self {
        let render = |ds: Vec<Diagnostic>| -> Vec<QuickfixEntry> {
            ds.iter().map(Diagnostic::render).collect()
        };
        if !set.errors.is_empty() {
            let n = set.errors.len();
            Envelope {
                message: format!(
                    "{} failed with {} {}, check quickfix",
                    label,
                    n,
                    if n == 1 { "error" } else { "errors" }
                ),
                quickfix: render(set.errors),
            }
        } else if !set.warnings.is_empty() {
            Envelope {
                message: format!("{} succeeded with warnings, check quickfix", label),
                quickfix: render(set.warnings),
            }
        } else {
            Envelope::failure(format!("{}: success", label))
        }
    }
}

/// Runs one request to completion. Every failure ends up as the envelope's
/// message with an empty quickfix list.
pub fn run(request: &Request, probe: &dyn ProjectProbe, runner: &dyn ToolRunner) -> Envelope {
    match collect(request, probe, runner) {
        Ok(set) => Envelope::summarize(&request.label(), set),
        Err(e) => {
            debug!("{} failed: {:?}", request.label(), e);
            Envelope::failure(e.to_string())
        }
    }
}

/// Locates the project, runs the tool and parses its output into deduplicated
/// diagnostics.
pub fn collect(
    request: &Request,
    probe: &dyn ProjectProbe,
    runner: &dyn ToolRunner,
) -> QfResult<DiagnosticSet> {
    let tool = request.tool;
    // An empty buffer comes through without a file name.
    let (Some(file), Some(cwd)) = (&request.file, &request.cwd) else {
        return Err(tool.marker_error());
    };
    let subcommand = Subcommand::parse(tool, &request.command)?;

    let start = cwd.join(file);
    let start_dir = start.parent().unwrap_or(&start);
    let project_root =
        find_project_root(start_dir, tool.markers(), probe).ok_or_else(|| tool.marker_error())?;
    debug!("{} project root: {}", tool.name(), project_root.display());

    let program = request.program();
    let (invocation, paths) = match tool {
        Tool::Cargo => {
            let workspace_root = find_workspace_root(&project_root, probe);
            (
                ToolInvocation {
                    program: program.clone(),
                    args: vec![request.command.clone(), "--message-format=json".to_string()],
                    dir: project_root,
                    merge_stderr: false,
                },
                PathContext::new(workspace_root, cwd.clone()),
            )
        }
        Tool::Bazel => {
            let mut args = vec![request.command.clone()];
            // bazel keeps test logs to itself unless asked; the panic blocks
            // are what the test pass reads.
            if subcommand == Subcommand::Test {
                args.push("--test_output=errors".to_string());
            }
            args.push(request.target.clone());
            (
                ToolInvocation {
                    program: program.clone(),
                    args,
                    dir: cwd.clone(),
                    merge_stderr: true,
                },
                PathContext::new(project_root, cwd.clone()),
            )
        }
    };

    debug!(
        "paths from {} rewritten for {}",
        paths.tool_root().display(),
        paths.caller_cwd().display()
    );

    let output = runner
        .run(&invocation)
        .map_err(|source| QfError::Spawn {
            program: program.clone(),
            dir: invocation.dir.clone(),
            source,
        })?;

    let set = match (tool, subcommand) {
        (Tool::Cargo, Subcommand::Build) => parse_build_output(&output, &paths, &program)?,
        (Tool::Cargo, Subcommand::Test) => {
            // The JSON pass only contributes errors; a stale-cache warning on
            // every test run would be noise.
            let build = parse_build_output(&output, &paths, &program)?;
            let errors = if build.errors.is_empty() {
                parse_test_output(&output, &paths)?
            } else {
                debug!("compile errors, skipping test output");
                build.errors
            };
            DiagnosticSet {
                errors,
                warnings: Vec::new(),
            }
        }
        (Tool::Bazel, Subcommand::Build) => parse_bazel_output(&output, &paths),
        (Tool::Bazel, Subcommand::Test) => {
            let mut build = parse_bazel_output(&output, &paths);
            if build.errors.is_empty() {
                build.errors = parse_test_output(&output, &paths)?;
            } else {
                debug!("compile errors, skipping test output");
            }
            build
        }
    };

    Ok(set.deduped())
}
