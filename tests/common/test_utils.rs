#![allow(dead_code)]
use std::fs;
use std::io::Result as IoResult;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// A wrapper around a temporary project directory.
pub struct TestProject {
    /// The temporary directory. When this is dropped, the directory and its contents are removed.
    pub temp_dir: TempDir,
    /// The root directory for the generated project.
    pub root: PathBuf,
}

impl TestProject {
    /// Create an empty directory named `project_name` with no root marker.
    pub fn bare(project_name: &str) -> IoResult<Self> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().join(project_name);
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src").join("main.rs"), "fn main() {}\n")?;
        Ok(TestProject { temp_dir, root })
    }

    /// Create a cargo package with a `src/main.rs`.
    pub fn cargo(project_name: &str) -> IoResult<Self> {
        let project = TestProject::bare(project_name)?;
        fs::write(
            project.root.join("Cargo.toml"),
            format!(
                "[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
                project_name
            ),
        )?;
        Ok(project)
    }

    /// Create a bazel workspace with the sources under `src/`.
    pub fn bazel(project_name: &str) -> IoResult<Self> {
        let project = TestProject::bare(project_name)?;
        fs::write(project.root.join("WORKSPACE"), "")?;
        Ok(project)
    }

    /// Returns a reference to the project root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn main_rs(&self) -> PathBuf {
        self.root.join("src").join("main.rs")
    }

    /// Writes an executable shell script that prints `stdout`, optionally
    /// writes `stderr`, and exits with `code`. Stands in for cargo or bazel.
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, stdout: &str, stderr: &str, code: i32) -> IoResult<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = self.temp_dir.path().join("bin");
        fs::create_dir_all(&bin_dir)?;
        fs::write(bin_dir.join(format!("{}.out", name)), stdout)?;
        fs::write(bin_dir.join(format!("{}.err", name)), stderr)?;
        let script = bin_dir.join(name);
        fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$@\" > \"{dir}/{name}.args\"\ncat \"{dir}/{name}.out\"\ncat \"{dir}/{name}.err\" >&2\nexit {code}\n",
                dir = bin_dir.display(),
                name = name,
                code = code
            ),
        )?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        Ok(script)
    }

    /// The arguments the fake tool was last called with.
    pub fn fake_tool_args(&self, name: &str) -> IoResult<String> {
        let args = fs::read_to_string(self.temp_dir.path().join("bin").join(format!("{}.args", name)))?;
        Ok(args.trim().to_string())
    }
}
