use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use toml::{Table, Value};

/// Filesystem questions asked while locating a project root.
pub trait ProjectProbe {
    fn is_file(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`ProjectProbe`] backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProbe;

impl ProjectProbe for RealProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Walks from `start` up to the filesystem root and returns the first
/// directory containing one of `markers`.
pub fn find_project_root(
    start: &Path,
    markers: &[&str],
    probe: &dyn ProjectProbe,
) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| markers.iter().any(|marker| probe.is_file(&dir.join(marker))))
        .map(Path::to_path_buf)
}

/// Cargo reports file names relative to the workspace root, which may sit
/// above the package that owns the edited file.
///
/// Returns the nearest directory at or above `package_root` whose
/// `Cargo.toml` has a `[workspace]` table, or `package_root` itself.
pub fn find_workspace_root(package_root: &Path, probe: &dyn ProjectProbe) -> PathBuf {
    for dir in package_root.ancestors() {
        let manifest = dir.join("Cargo.toml");
        if !probe.is_file(&manifest) {
            continue;
        }
        let contents = match probe.read_to_string(&manifest) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("cannot read {}: {}", manifest.display(), e);
                continue;
            }
        };
        match is_workspace_manifest(&contents) {
            Ok(true) => return dir.to_path_buf(),
            Ok(false) => {}
            Err(e) => debug!("cannot parse {}: {}", manifest.display(), e),
        }
    }
    package_root.to_path_buf()
}

/// True when the manifest declares a `[workspace]` table.
pub fn is_workspace_manifest(contents: &str) -> Result<bool, toml::de::Error> {
    let manifest: Table = contents.parse::<Table>()?;
    Ok(manifest.get("workspace").is_some_and(Value::is_table))
}
