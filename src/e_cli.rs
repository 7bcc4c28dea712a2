use std::env;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::e_dispatch::{Envelope, Request, Tool};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs cargo or bazel and prints a JSON quickfix list for your editor.", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        short = 't',
        value_enum,
        default_value_t = Tool::Cargo,
        help = "Build tool to run."
    )]
    pub tool: Tool,

    #[arg(long, help = "cargo program to run (default: $CARGO, then `cargo`).")]
    pub cargo: Option<String>,

    #[arg(long, help = "bazel program to run (default: `bazel`).")]
    pub bazel: Option<String>,

    #[arg(
        long,
        default_value = "//...",
        help = "Target pattern passed to bazel."
    )]
    pub target: String,

    #[arg(help = "Subcommand: build, check, clippy or test for cargo; build or test for bazel.")]
    pub command: String,

    #[arg(help = "File open in the editor; the project root is searched from here.")]
    pub file: Option<PathBuf>,

    #[arg(help = "Editor working directory; quickfix paths are relative to it.")]
    pub cwd: Option<PathBuf>,
}

impl Cli {
    /// Parses arguments, dropping the `qf` cargo inserts when run as `cargo qf`.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.len() > 1 && args[1] == "qf" {
            args.remove(1);
        }
        Cli::try_parse_from(args)
    }

    /// The editor expects an envelope even for a bad command line. `None` for
    /// `--help`/`--version`, which clap should print itself.
    pub fn usage_failure(err: &clap::Error) -> Option<Envelope> {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
            _ => Some(Envelope::failure(err.to_string().trim_end())),
        }
    }

    /// Builds the request. Program overrides and the missing-cwd fallback are
    /// read from the environment here so that [`crate::run`] stays pure.
    pub fn into_request(self) -> Request {
        let program = match self.tool {
            Tool::Cargo => self.cargo.or_else(|| env::var("CARGO").ok()),
            Tool::Bazel => self.bazel,
        };
        let cwd = match (&self.file, self.cwd) {
            (_, Some(cwd)) => Some(cwd),
            (Some(_), None) => env::current_dir().ok(),
            (None, None) => None,
        };
        Request {
            tool: self.tool,
            command: self.command,
            file: self.file,
            cwd,
            target: self.target,
            program,
        }
    }
}
