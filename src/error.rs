//! Error types for musl-crossbuild operations.
//!
//! All errors carry actionable messages; the taxonomy mirrors the stages of a
//! build run (preflight, manifest inspection, container execution).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for musl-crossbuild operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Main error type for all musl-crossbuild operations
#[derive(Error, Debug)]
pub enum BuildError {
    /// Docker daemon and container errors
    #[error("Docker error: {0}")]
    Docker(#[from] DockerError),

    /// Project manifest errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Docker daemon and container execution errors
#[derive(Error, Debug)]
pub enum DockerError {
    /// Docker is not installed or the daemon is not responding
    #[error("Docker is not available: {reason}")]
    Unavailable {
        /// Diagnostic detail including startup guidance
        reason: String,
    },

    /// Spawning or waiting on a docker process failed
    #[error("Failed to run '{command}': {reason}")]
    ExecutionFailed {
        /// The docker invocation that failed
        command: String,
        /// Reason for the failure
        reason: String,
    },

    /// The containerized build exceeded the wall-clock timeout
    #[error("Build timed out after {minutes} minutes: {reason}")]
    Timeout {
        /// Configured timeout in minutes
        minutes: u64,
        /// Diagnostic detail
        reason: String,
    },

    /// The container was killed by the kernel OOM killer
    #[error("Container ran out of memory: {reason}")]
    OutOfMemory {
        /// Diagnostic detail including detection method and limits
        reason: String,
    },

    /// The build command inside the container exited non-zero
    #[error("Containerized build failed with exit code {code}: {reason}")]
    BuildFailed {
        /// Exit code reported by the container (or -1 if unknown)
        code: i32,
        /// Captured stderr, if any
        reason: String,
    },
}

/// Project manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Project directory does not exist or is not a directory
    #[error("Project path is not a directory: {path}")]
    NotADirectory {
        /// Path that was checked
        path: PathBuf,
    },

    /// No Cargo.toml in the project directory
    #[error("No Cargo.toml found at {path}. Run from a Cargo project directory.")]
    MissingCargoToml {
        /// Path where Cargo.toml was expected
        path: PathBuf,
    },

    /// Manifest parsed but describes nothing buildable
    #[error("Invalid manifest at {path}: {reason}")]
    InvalidManifest {
        /// Path to the manifest
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// CLI argument errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid argument combination or value
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl BuildError {
    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BuildError::Docker(DockerError::Unavailable { .. }) => vec![
                "Ensure Docker is installed: https://docs.docker.com/get-docker/".to_string(),
                "Check the daemon is running: docker ps".to_string(),
            ],
            BuildError::Docker(DockerError::OutOfMemory { .. }) => vec![
                "Raise the limit: musl-crossbuild --docker-memory 8g".to_string(),
                "Close other memory-heavy processes and retry".to_string(),
            ],
            BuildError::Docker(DockerError::Timeout { .. }) => vec![
                "Raise the timeout: musl-crossbuild --timeout-mins 40".to_string(),
                "Check network connectivity (dependency downloads can be slow)".to_string(),
            ],
            BuildError::Manifest(ManifestError::MissingCargoToml { .. }) => vec![
                "cd into the project directory, or pass its path as an argument".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Exit code to propagate to the shell.
    ///
    /// Build failures carry the container's own exit code; everything else
    /// maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Docker(DockerError::BuildFailed { code, .. }) if *code > 0 => *code,
            _ => 1,
        }
    }
}
