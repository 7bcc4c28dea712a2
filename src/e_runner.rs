use crate::prelude::*;

/// A single build tool run: program, arguments and where to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
    /// Append stderr to the captured text. bazel prints compiler errors there.
    pub merge_stderr: bool,
}

impl ToolInvocation {
    /// The command line as a user would type it, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs a build tool and hands back what it printed.
///
/// A nonzero exit status is not an error: cargo and bazel exit nonzero exactly
/// when there is something to report.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<String>;
}

/// [`ToolRunner`] that spawns the real process and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<String> {
        debug!("Running: {} (in {})", invocation.display(), invocation.dir.display());
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        // Without this the tool's progress output would end up in the editor.
        if invocation.merge_stderr {
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stderr(Stdio::null());
        }

        #[cfg(windows)]
        {
            // Keep gvim from flashing a console window.
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = cmd.output()?;
        debug!("Process exited with status: {:?}", output.status.code());

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        if invocation.merge_stderr {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }
        Ok(text)
    }
}
