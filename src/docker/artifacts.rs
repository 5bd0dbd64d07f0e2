//! Artifact verification for containerized builds.

use crate::cli::RuntimeConfig;
use crate::error::{DockerError, Result};
use crate::manifest::ProjectInfo;
use crate::target::CrossTarget;
use std::path::PathBuf;

/// Verifies the binaries a successful build is expected to have produced.
///
/// Each known binary target must exist under `target/<triple>/release/` and
/// be non-empty. Projects with no known binaries (library crates, virtual
/// workspace roots) only need the release directory itself to exist.
pub fn verify_artifacts(
    project: &ProjectInfo,
    target: &CrossTarget,
    runtime: &RuntimeConfig,
) -> Result<Vec<PathBuf>> {
    let release_dir = project.root.join(target.release_dir());

    if !release_dir.is_dir() {
        return Err(DockerError::BuildFailed {
            code: -1,
            reason: format!(
                "Build reported success but the release directory is missing: {}\n\
                 Expected artifacts from the container build.",
                release_dir.display()
            ),
        }
        .into());
    }

    let mut verified = Vec::new();
    for name in &project.binaries {
        let path = release_dir.join(name);

        let metadata = std::fs::metadata(&path).map_err(|e| DockerError::BuildFailed {
            code: -1,
            reason: format!("Cannot read expected binary {}: {}", path.display(), e),
        })?;

        if metadata.len() == 0 {
            return Err(DockerError::BuildFailed {
                code: -1,
                reason: format!(
                    "Binary is empty (0 bytes): {}\n\
                     This indicates a failed or incomplete build.",
                    path.display()
                ),
            }
            .into());
        }

        runtime.indent(&format!("✓ Verified: {} ({} bytes)", name, metadata.len()));
        verified.push(path);
    }

    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_build_output(binary: &str, contents: &[u8]) -> (TempDir, ProjectInfo) {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(
            dir.path().join("Cargo.toml"),
            format!("[package]\nname = \"{binary}\"\nversion = \"0.1.0\"\n"),
        )
        .expect("write manifest");
        fs::create_dir_all(dir.path().join("src")).expect("create src");
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").expect("write main");

        let release = dir
            .path()
            .join(CrossTarget::aarch64_musl().release_dir());
        fs::create_dir_all(&release).expect("create release dir");
        fs::write(release.join(binary), contents).expect("write binary");

        let info = ProjectInfo::inspect(dir.path()).expect("inspect");
        (dir, info)
    }

    #[test]
    fn verifies_non_empty_binary() {
        let (_dir, info) = project_with_build_output("demo", b"\x7fELF...");
        let target = CrossTarget::aarch64_musl();
        let runtime = RuntimeConfig::new(false, true);

        let artifacts = verify_artifacts(&info, &target, &runtime).expect("verify");
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].ends_with("demo"));
    }

    #[test]
    fn rejects_empty_binary() {
        let (_dir, info) = project_with_build_output("demo", b"");
        let target = CrossTarget::aarch64_musl();
        let runtime = RuntimeConfig::new(false, true);

        let err = verify_artifacts(&info, &target, &runtime).expect_err("should fail");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_missing_release_dir() {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
        )
        .expect("write manifest");
        let info = ProjectInfo::inspect(dir.path()).expect("inspect");
        let runtime = RuntimeConfig::new(false, true);

        let err = verify_artifacts(&info, &CrossTarget::aarch64_musl(), &runtime)
            .expect_err("should fail");
        assert!(err.to_string().contains("release directory is missing"));
    }
}
