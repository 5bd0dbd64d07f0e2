//! Docker integration for containerized cross builds.
//!
//! Every build runs in a fresh, ephemeral container from a registry image
//! (pulled implicitly by `docker run`). The host project directory is
//! bind-mounted read-write so artifacts land under the host `target/`
//! directory; the container itself leaves no residue.
//!
//! # Module Structure
//!
//! - `artifacts` - Post-build artifact verification
//! - `daemon` - Docker daemon availability check
//! - `guard` - RAII guard for container cleanup
//! - `limits` - Resource limits for the build container
//! - `runner` - Ephemeral container execution

mod artifacts;
mod daemon;
mod guard;
mod limits;
mod runner;

pub use artifacts::verify_artifacts;
pub use daemon::check_docker_available;
pub use limits::ContainerLimits;
pub use runner::{ContainerRunner, DEFAULT_RUN_TIMEOUT};
