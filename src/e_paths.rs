// src/e_paths.rs
use std::path::{Component, Path, PathBuf};

/// The (tool root, caller cwd) pair every parser rewrites paths against.
///
/// Built once per invocation and handed to the parsers by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    tool_root: PathBuf,
    caller_cwd: PathBuf,
}

impl PathContext {
    pub fn new(tool_root: impl Into<PathBuf>, caller_cwd: impl Into<PathBuf>) -> Self {
        PathContext {
            tool_root: tool_root.into(),
            caller_cwd: caller_cwd.into(),
        }
    }

    /// A context whose root and cwd are the same directory, so relative paths
    /// come back unchanged. Handy in tests.
    pub fn identity() -> Self {
        PathContext::new("/", "/")
    }

    pub fn tool_root(&self) -> &Path {
        &self.tool_root
    }

    pub fn caller_cwd(&self) -> &Path {
        &self.caller_cwd
    }

    /// Rewrites a path reported by the build tool into one the editor can open
    /// from its working directory.
    pub fn resolve(&self, tool_relative: &str) -> String {
        resolve(tool_relative, &self.tool_root, &self.caller_cwd)
            .to_string_lossy()
            .to_string()
    }

    /// Passes a path through untouched. Used for virtual macro locations that
    /// have no counterpart under the tool root.
    pub fn resolve_verbatim(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Joins `tool_relative` onto `tool_root` and expresses the result relative to
/// `caller_cwd`.
///
/// Purely lexical, the filesystem is never consulted. An absolute
/// `tool_relative` replaces the root instead of being appended to it.
///
/// ```
/// use cargo_qf::resolve;
/// use std::path::{Path, PathBuf};
///
/// let p = resolve("src/lib.rs", Path::new("/work/app"), Path::new("/work/app/src"));
/// assert_eq!(p, PathBuf::from("lib.rs"));
///
/// let p = resolve("src/lib.rs", Path::new("/work/app"), Path::new("/work/other"));
/// assert_eq!(p, PathBuf::from("../app/src/lib.rs"));
/// ```
pub fn resolve(tool_relative: &str, tool_root: &Path, caller_cwd: &Path) -> PathBuf {
    let absolute = normalize(&tool_root.join(tool_relative));
    let base = normalize(caller_cwd);
    match pathdiff::diff_paths(&absolute, &base) {
        Some(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Some(rel) => rel,
        None => absolute,
    }
}

/// Lexically collapses `.` and `..` components.
///
/// `..` directly under the root is dropped, a leading `..` on a relative path
/// is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}
