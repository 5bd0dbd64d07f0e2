//! # musl-crossbuild
//!
//! Containerized cross-compilation of Cargo projects for aarch64 musl targets.
//!
//! The whole tool is one linear pipeline with fail-fast semantics: the
//! project directory is bind-mounted into an ephemeral Docker container, the
//! `aarch64-unknown-linux-musl` target and the native musl toolchain are
//! installed inside it, and a release build runs restricted to that triple.
//! The container is discarded whether the build succeeds or fails; artifacts
//! stay on the host under `target/<triple>/release/`.
//!
//! ## Usage
//!
//! ```bash
//! musl-crossbuild                  # build the current directory
//! musl-crossbuild /path/to/project
//! musl-crossbuild --target x86_64-unknown-linux-musl
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod docker;
pub mod error;
pub mod manifest;
pub mod target;

pub use cli::{Args, OutputManager, RuntimeConfig};
pub use docker::{ContainerLimits, ContainerRunner};
pub use error::{BuildError, CliError, DockerError, ManifestError, Result};
pub use manifest::ProjectInfo;
pub use target::{CrossTarget, DEFAULT_IMAGE, DEFAULT_TARGET};
