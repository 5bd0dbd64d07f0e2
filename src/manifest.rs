//! Project manifest inspection.
//!
//! Before any container is started, the project's `Cargo.toml` is parsed to
//! confirm there is something buildable and to learn which binaries the
//! release build is expected to produce. A directory without a manifest fails
//! here, before Docker is touched.

use crate::error::{ManifestError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed view of the fields this tool cares about in a Cargo.toml
#[derive(Debug, Clone, Deserialize)]
struct CargoManifest {
    package: Option<PackageSection>,
    workspace: Option<toml::Value>,
    #[serde(default)]
    bin: Vec<BinSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct PackageSection {
    name: String,
    version: Option<toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct BinSection {
    name: Option<String>,
}

/// Information about the project that will be built in the container
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    /// Absolute path to the project directory
    pub root: PathBuf,
    /// Package name from the manifest (None for a virtual workspace root)
    pub package_name: Option<String>,
    /// Binary target names expected under `target/<triple>/release/`
    pub binaries: Vec<String>,
}

impl ProjectInfo {
    /// Inspects the project directory and parses its manifest.
    ///
    /// Resolves `path` to an absolute directory, requires a `Cargo.toml`
    /// inside it, and collects binary target names. Explicit `[[bin]]`
    /// sections win; otherwise a package with a `src/main.rs` yields one
    /// binary named after the package. A virtual workspace root (no
    /// `[package]`) is accepted with no known binaries, since cargo builds
    /// its members' manifests, not this one.
    pub fn inspect(path: &Path) -> Result<Self> {
        let root = path
            .canonicalize()
            .map_err(|_| ManifestError::NotADirectory {
                path: path.to_path_buf(),
            })?;

        if !root.is_dir() {
            return Err(ManifestError::NotADirectory { path: root }.into());
        }

        let manifest_path = root.join("Cargo.toml");
        if !manifest_path.exists() {
            return Err(ManifestError::MissingCargoToml {
                path: manifest_path,
            }
            .into());
        }

        let content = std::fs::read_to_string(&manifest_path)?;
        let manifest: CargoManifest = toml::from_str(&content)?;

        if manifest.package.is_none() && manifest.workspace.is_none() {
            return Err(ManifestError::InvalidManifest {
                path: manifest_path,
                reason: "manifest has neither a [package] nor a [workspace] section".to_string(),
            }
            .into());
        }

        let package_name = manifest.package.as_ref().map(|p| p.name.clone());

        if let Some(package) = &manifest.package {
            if package.version.is_none() {
                log::debug!(
                    "package '{}' has no explicit version (workspace-inherited?)",
                    package.name
                );
            }
        }

        let mut binaries: Vec<String> = manifest
            .bin
            .iter()
            .filter_map(|b| b.name.clone())
            .collect();

        if binaries.is_empty() {
            if let Some(name) = &package_name {
                if root.join("src").join("main.rs").exists() {
                    binaries.push(name.clone());
                }
            }
        }

        Ok(Self {
            root,
            package_name,
            binaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_project(manifest: &str, with_main: bool) -> TempDir {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("Cargo.toml"), manifest).expect("write manifest");
        if with_main {
            fs::create_dir_all(dir.path().join("src")).expect("create src");
            fs::write(dir.path().join("src/main.rs"), "fn main() {}").expect("write main");
        }
        dir
    }

    #[test]
    fn plain_binary_package() {
        let dir = write_project(
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
            true,
        );
        let info = ProjectInfo::inspect(dir.path()).expect("inspect");
        assert_eq!(info.package_name.as_deref(), Some("demo"));
        assert_eq!(info.binaries, vec!["demo".to_string()]);
    }

    #[test]
    fn explicit_bin_sections_win() {
        let dir = write_project(
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n\
             [[bin]]\nname = \"demo-cli\"\npath = \"src/main.rs\"\n",
            true,
        );
        let info = ProjectInfo::inspect(dir.path()).expect("inspect");
        assert_eq!(info.binaries, vec!["demo-cli".to_string()]);
    }

    #[test]
    fn library_only_package_has_no_binaries() {
        let dir = write_project("[package]\nname = \"demo\"\nversion = \"0.1.0\"\n", false);
        let info = ProjectInfo::inspect(dir.path()).expect("inspect");
        assert!(info.binaries.is_empty());
    }

    #[test]
    fn virtual_workspace_root_is_accepted() {
        let dir = write_project("[workspace]\nmembers = [\"crates/*\"]\n", false);
        let info = ProjectInfo::inspect(dir.path()).expect("inspect");
        assert!(info.package_name.is_none());
        assert!(info.binaries.is_empty());
    }

    #[test]
    fn missing_manifest_is_rejected() {
        let dir = TempDir::new().expect("create temp dir");
        let err = ProjectInfo::inspect(dir.path()).expect_err("should fail");
        assert!(err.to_string().contains("Cargo.toml"));
    }

    #[test]
    fn missing_directory_is_rejected() {
        let err =
            ProjectInfo::inspect(Path::new("/nonexistent/project/dir")).expect_err("should fail");
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn manifest_without_package_or_workspace_is_rejected() {
        let dir = write_project("[dependencies]\nserde = \"1\"\n", false);
        let err = ProjectInfo::inspect(dir.path()).expect_err("should fail");
        assert!(err.to_string().contains("neither"));
    }
}
