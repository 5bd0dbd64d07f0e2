//! Cross-compilation target description.
//!
//! The target triple is static configuration. The default encodes the only
//! target this tool was written for: ARM64 Linux with the musl C library,
//! suitable for statically linked release binaries.

use std::path::PathBuf;

/// Default cross-compilation target triple
pub const DEFAULT_TARGET: &str = "aarch64-unknown-linux-musl";

/// Default builder image (pulled implicitly by `docker run`)
pub const DEFAULT_IMAGE: &str = "rust:latest";

/// Mount point for the project directory inside the container
pub const CONTAINER_WORKDIR: &str = "/app";

/// A cross-compilation target and the in-container commands needed to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTarget {
    triple: String,
}

impl CrossTarget {
    /// Creates a target from an explicit triple.
    pub fn new(triple: impl Into<String>) -> Self {
        Self {
            triple: triple.into(),
        }
    }

    /// The aarch64 musl target this tool defaults to.
    pub fn aarch64_musl() -> Self {
        Self::new(DEFAULT_TARGET)
    }

    /// The target triple string.
    pub fn triple(&self) -> &str {
        &self.triple
    }

    /// Directory (relative to the project root) where release artifacts land.
    pub fn release_dir(&self) -> PathBuf {
        PathBuf::from("target").join(&self.triple).join("release")
    }

    /// Shell command executed inside the build container.
    ///
    /// One `&&` chain so the first failing step aborts the whole run:
    /// register the target with rustup, install the native toolchain and musl
    /// development packages, then build in release mode for the triple.
    pub fn build_script(&self) -> String {
        format!(
            "rustup target add {triple} && \
             apt-get update -qq && \
             apt-get install -y --no-install-recommends build-essential musl-tools && \
             cargo build --release --target {triple}",
            triple = self.triple
        )
    }
}

impl Default for CrossTarget {
    fn default() -> Self {
        Self::aarch64_musl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_is_aarch64_musl() {
        assert_eq!(CrossTarget::default().triple(), "aarch64-unknown-linux-musl");
    }

    #[test]
    fn release_dir_includes_triple() {
        let dir = CrossTarget::aarch64_musl().release_dir();
        assert_eq!(
            dir,
            PathBuf::from("target/aarch64-unknown-linux-musl/release")
        );
    }

    #[test]
    fn build_script_runs_steps_in_order() {
        let script = CrossTarget::aarch64_musl().build_script();

        let rustup = script.find("rustup target add aarch64-unknown-linux-musl");
        let install = script.find("apt-get install");
        let build = script.find("cargo build --release --target aarch64-unknown-linux-musl");

        assert!(rustup.is_some(), "missing rustup step: {script}");
        assert!(install.is_some(), "missing install step: {script}");
        assert!(build.is_some(), "missing build step: {script}");
        assert!(rustup < install && install < build, "steps out of order");
    }

    #[test]
    fn build_script_installs_musl_toolchain() {
        let script = CrossTarget::aarch64_musl().build_script();
        assert!(script.contains("build-essential"));
        assert!(script.contains("musl-tools"));
    }

    #[test]
    fn custom_triple_flows_through() {
        let target = CrossTarget::new("x86_64-unknown-linux-musl");
        assert!(target
            .build_script()
            .contains("cargo build --release --target x86_64-unknown-linux-musl"));
    }
}
