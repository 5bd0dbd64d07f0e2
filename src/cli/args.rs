//! Command line argument parsing and validation.
//!
//! The tool is designed to "just work": run it from a Cargo project directory
//! with no arguments and it cross-builds for aarch64 musl. Every flag is an
//! optional override.

use crate::target::{DEFAULT_IMAGE, DEFAULT_TARGET};
use clap::Parser;
use std::path::PathBuf;

/// Containerized cross-build tool for static aarch64 musl binaries
#[derive(Parser, Debug)]
#[command(
    name = "musl-crossbuild",
    version,
    about = "Cross-compile a Cargo project for aarch64 musl in an ephemeral Docker container",
    long_about = "Cross-compile a Cargo project for aarch64-unknown-linux-musl.

The project directory is bind-mounted into a throwaway Docker container,
the musl target and native toolchain are installed there, and
`cargo build --release --target aarch64-unknown-linux-musl` runs against it.
Artifacts land under target/<triple>/release/ on the host.

Usage:
  musl-crossbuild
  musl-crossbuild /path/to/project
  musl-crossbuild --target x86_64-unknown-linux-musl --image rust:1.80"
)]
pub struct Args {
    /// Project directory containing Cargo.toml
    #[arg(index = 1, value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Cross-compilation target triple
    #[arg(long, value_name = "TRIPLE", default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Builder image (pulled by docker run if missing)
    #[arg(long, value_name = "IMAGE", default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// Container memory limit (e.g. "4g", "4096m"); auto-detected by default
    #[arg(long, value_name = "SIZE")]
    pub docker_memory: Option<String>,

    /// Container memory + swap limit; defaults to memory + 2GB
    #[arg(long, value_name = "SIZE")]
    pub docker_memory_swap: Option<String>,

    /// Container CPU limit (fractional allowed, e.g. "1.5")
    #[arg(long, value_name = "CPUS")]
    pub docker_cpus: Option<String>,

    /// Container process limit
    #[arg(long, value_name = "N", default_value_t = 1000)]
    pub docker_pids_limit: u32,

    /// Build timeout in minutes
    #[arg(long, value_name = "MINS", default_value_t = 20)]
    pub timeout_mins: u64,

    /// Show verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.target.is_empty() {
            return Err("Target triple must not be empty".to_string());
        }

        if self.image.is_empty() {
            return Err("Builder image must not be empty".to_string());
        }

        if self.timeout_mins == 0 {
            return Err("Timeout must be at least 1 minute".to_string());
        }

        if self.timeout_mins > 24 * 60 {
            return Err(format!(
                "Timeout too high: {} minutes (maximum: 24 hours)",
                self.timeout_mins
            ));
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print a plain message
    pub fn println(&self, message: &str) {
        self.output.println(message);
    }

    /// Print a verbose message
    pub fn verbose_println(&self, message: &str) {
        self.output.verbose(message);
    }

    /// Print an error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.output.warn(message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.output.success(message);
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) {
        self.output.progress(message);
    }

    /// Print indented text (streamed tool output)
    pub fn indent(&self, message: &str) {
        self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn bare_invocation_uses_defaults() {
        let args = Args::parse_from(["musl-crossbuild"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert_eq!(args.target, "aarch64-unknown-linux-musl");
        assert_eq!(args.image, "rust:latest");
        assert_eq!(args.timeout_mins, 20);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn overrides_are_honored() {
        let args = Args::parse_from([
            "musl-crossbuild",
            "/some/project",
            "--target",
            "x86_64-unknown-linux-musl",
            "--image",
            "rust:1.80",
            "--timeout-mins",
            "45",
        ]);
        assert_eq!(args.path, PathBuf::from("/some/project"));
        assert_eq!(args.target, "x86_64-unknown-linux-musl");
        assert_eq!(args.image, "rust:1.80");
        assert_eq!(args.timeout_mins, 45);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = Args::parse_from(["musl-crossbuild", "--timeout-mins", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["musl-crossbuild", "-v", "-q"]).is_err());
    }
}
