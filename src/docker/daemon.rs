//! Docker daemon availability check.
//!
//! Runs before any container is started so that a missing or dead daemon
//! fails fast, before any build-tool output appears.

use crate::error::DockerError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Timeout for the `docker info` availability probe.
/// A live daemon answers this in well under a second.
pub const DOCKER_INFO_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(target_os = "macos")]
const DOCKER_START_HELP: &str = "Start Docker Desktop from Applications or Spotlight";

#[cfg(target_os = "linux")]
const DOCKER_START_HELP: &str = "Start Docker daemon: sudo systemctl start docker";

#[cfg(target_os = "windows")]
const DOCKER_START_HELP: &str = "Start Docker Desktop from the Start menu";

/// Checks that Docker is installed and the daemon is responding.
pub async fn check_docker_available() -> Result<(), DockerError> {
    let status_result = timeout(
        DOCKER_INFO_TIMEOUT,
        Command::new("docker")
            .arg("info")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status(),
    )
    .await;

    match status_result {
        // Probe timed out
        Err(_) => Err(DockerError::Unavailable {
            reason: format!(
                "Docker daemon check timed out after {} seconds.\n\
                 \n\
                 This usually means Docker is not responding.\n\
                 {}\n\
                 \n\
                 If Docker is running, check: docker ps",
                DOCKER_INFO_TIMEOUT.as_secs(),
                DOCKER_START_HELP
            ),
        }),

        Ok(Ok(status)) if status.success() => Ok(()),

        // Docker binary exists but the daemon isn't responding
        Ok(Ok(status)) => Err(DockerError::Unavailable {
            reason: format!(
                "Docker daemon is not responding (exit code: {}).\n\
                 \n\
                 {}\n\
                 \n\
                 If Docker is installed, ensure the daemon is running.\n\
                 If not installed, visit: https://docs.docker.com/get-docker/",
                status.code().unwrap_or(-1),
                DOCKER_START_HELP
            ),
        }),

        // Docker binary not found
        Ok(Err(e)) => Err(DockerError::Unavailable {
            reason: format!(
                "Docker command not found: {}\n\
                 \n\
                 Docker does not appear to be installed.\n\
                 Install from: https://docs.docker.com/get-docker/",
                e
            ),
        }),
    }
}
