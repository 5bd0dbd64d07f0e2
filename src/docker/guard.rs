//! RAII guard for build container cleanup.

use std::time::Duration;
use wait_timeout::ChildExt;

/// Removes the named container when dropped.
///
/// `docker run --rm` handles the normal exit path; this guard covers abnormal
/// termination (panic, timeout kill). The wait is bounded so an unresponsive
/// daemon cannot hang the drop.
pub(super) struct ContainerGuard {
    pub(super) name: String,
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        let mut child = match std::process::Command::new("docker")
            .args(["rm", "-f", &self.name])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            // Docker binary missing; nothing left to clean up with
            Err(_) => return,
        };

        let timeout = Duration::from_secs(5);
        match child.wait_timeout(timeout) {
            Ok(Some(status)) => {
                if !status.success() {
                    log::debug!(
                        "container '{}' cleanup exited with code {}",
                        self.name,
                        status.code().unwrap_or(-1)
                    );
                }
            }
            Ok(None) => {
                // Daemon unresponsive; kill the hanging docker command and reap it
                let _ = child.kill();
                let _ = child.wait();

                eprintln!(
                    "Warning: Timed out cleaning up container '{}' after {} seconds. \
                     Docker daemon may be down.",
                    self.name,
                    timeout.as_secs()
                );
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
            }
        }

        // Drop must never panic; all errors above are deliberately swallowed
    }
}
