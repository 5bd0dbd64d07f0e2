//! Ephemeral build container execution.
//!
//! Starts one `docker run --rm` with the project directory bind-mounted at
//! the fixed workdir, executes the cross-build command chain inside it, and
//! propagates the first failure. The container has no identity beyond a
//! single run.

use super::guard::ContainerGuard;
use super::limits::ContainerLimits;
use crate::cli::RuntimeConfig;
use crate::error::{DockerError, Result};
use crate::target::{CrossTarget, CONTAINER_WORKDIR};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

/// Default timeout for the containerized build (20 minutes).
/// A cold build downloads the target toolchain, apt packages, and all crates.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(1200);

/// Runs the cross build inside an ephemeral Docker container.
#[derive(Debug)]
pub struct ContainerRunner {
    image: String,
    project_root: PathBuf,
    limits: ContainerLimits,
    timeout: Duration,
}

impl ContainerRunner {
    /// Creates a runner for one project directory.
    ///
    /// `project_root` must already be an absolute, validated directory (see
    /// [`crate::manifest::ProjectInfo::inspect`]).
    pub fn new(
        project_root: PathBuf,
        image: String,
        limits: ContainerLimits,
        timeout: Duration,
    ) -> Self {
        Self {
            image,
            project_root,
            limits,
            timeout,
        }
    }

    /// Check if the container was killed by OOM via the Docker inspect API.
    ///
    /// With `--rm` the container is usually gone by the time we ask, in which
    /// case this reports false and the other detection paths decide.
    async fn check_container_oom_status(container_name: &str) -> std::io::Result<bool> {
        let output = Command::new("docker")
            .args([
                "inspect",
                container_name,
                "--format",
                "{{.State.OOMKilled}}",
            ])
            .output()
            .await?;

        if !output.status.success() {
            return Ok(false);
        }

        let oom_killed = String::from_utf8_lossy(&output.stdout)
            .trim()
            .to_lowercase();

        Ok(oom_killed == "true")
    }

    /// Builds the full `docker run` argument vector for one build.
    fn docker_args(&self, container_name: &str, target: &CrossTarget) -> Vec<String> {
        let mount = format!("{}:{}", self.project_root.display(), CONTAINER_WORKDIR);

        vec![
            "run".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            "--rm".to_string(),
            // The build needs root for the package install step, but nothing
            // beyond that: no new privileges, no capabilities
            "--security-opt".to_string(),
            "no-new-privileges".to_string(),
            "--cap-drop".to_string(),
            "ALL".to_string(),
            "--memory".to_string(),
            self.limits.memory.clone(),
            "--memory-swap".to_string(),
            self.limits.memory_swap.clone(),
            "--cpus".to_string(),
            self.limits.cpus.clone(),
            "--pids-limit".to_string(),
            self.limits.pids_limit.to_string(),
            // Project mounted read-write: artifacts land under target/ on the host
            "-v".to_string(),
            mount,
            "-w".to_string(),
            CONTAINER_WORKDIR.to_string(),
            self.image.clone(),
            "sh".to_string(),
            "-c".to_string(),
            target.build_script(),
        ]
    }

    /// Runs the cross build for `target` and waits for completion.
    ///
    /// Container stdout is streamed to the operator line by line; stderr is
    /// captured in a background task for failure diagnostics. The first
    /// failing step inside the container aborts the chain, and its exit code
    /// is surfaced in the returned error.
    pub async fn run(&self, target: &CrossTarget, runtime: &RuntimeConfig) -> Result<()> {
        let container_name = format!("musl-crossbuild-{}", Uuid::new_v4());

        // Guard removes the container on panic or timeout kill; the --rm flag
        // covers the normal exit path
        let _guard = ContainerGuard {
            name: container_name.clone(),
        };

        let docker_args = self.docker_args(&container_name, target);

        runtime.progress(&format!(
            "Building for {} in {} (container {})",
            target.triple(),
            self.image,
            container_name
        ));
        log::debug!("docker {}", docker_args.join(" "));

        let child = Command::new("docker")
            .args(&docker_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DockerError::ExecutionFailed {
                command: format!("docker {}", docker_args.join(" ")),
                reason: e.to_string(),
            })?;

        // One deadline for the whole run: a container that stalls while
        // holding stdout open must time out just like one that never exits
        let deadline = Instant::now() + self.timeout;

        let outcome = stream_and_wait(child, deadline, runtime)
            .await
            .map_err(|e| DockerError::ExecutionFailed {
                command: format!("docker {}", docker_args.join(" ")),
                reason: e.to_string(),
            })?;

        let (status, stderr_lines) = match outcome {
            WaitOutcome::Exited {
                status,
                stderr_lines,
            } => (status, stderr_lines),
            WaitOutcome::TimedOut => {
                let minutes = self.timeout.as_secs() / 60;
                runtime.warn(&format!(
                    "Build timed out after {} minutes, terminated",
                    minutes
                ));

                // The guard removes the container itself
                return Err(DockerError::Timeout {
                    minutes,
                    reason: format!(
                        "The containerized build did not finish in time.\n\
                         \n\
                         This usually indicates:\n\
                         • Slow toolchain or dependency downloads\n\
                         • System resource constraints\n\
                         \n\
                         Try:\n\
                         • musl-crossbuild --timeout-mins {}\n\
                         • Check available system memory/CPU",
                        minutes * 2
                    ),
                }
                .into());
            }
        };

        if !status.success() {
            return Err(self
                .diagnose_failure(&container_name, status.code(), stderr_lines)
                .await
                .into());
        }

        runtime.verbose_println("Container exited cleanly");
        Ok(())
    }

    /// Classifies a non-zero container exit: OOM kill or plain build failure.
    async fn diagnose_failure(
        &self,
        container_name: &str,
        exit_code: Option<i32>,
        stderr_lines: Vec<String>,
    ) -> DockerError {
        let exit_code = exit_code.unwrap_or(-1);
        let stderr_str = stderr_lines.join("\n");

        // 137 is SIGKILL, the usual signature of the kernel OOM killer
        let is_oom_exit_code = exit_code == 137;
        let is_oom_stderr = stderr_str.contains("OOMKilled")
            || stderr_str.contains("out of memory")
            || stderr_str.contains("Out of memory")
            || stderr_str.contains("Cannot allocate memory");
        let is_oom_status = Self::check_container_oom_status(container_name)
            .await
            .unwrap_or(false);

        if is_oom_exit_code || is_oom_stderr || is_oom_status {
            let mut sys = sysinfo::System::new();
            sys.refresh_memory();
            let total_memory_gb = sys.total_memory() / 1024 / 1024 / 1024;

            let mut reason = format!(
                "Current memory limit: {} (swap: {})\n\
                 \n\
                 The container exhausted available memory while building.\n\
                 \n\
                 Solutions:\n\
                 1. Increase the limit: musl-crossbuild --docker-memory 8g\n\
                 2. Check available system memory: {} GB total",
                self.limits.memory, self.limits.memory_swap, total_memory_gb,
            );

            if !stderr_str.is_empty() {
                reason.push_str("\n\nstderr:\n");
                reason.push_str(&stderr_str);
            }

            return DockerError::OutOfMemory { reason };
        }

        let reason = if !stderr_str.is_empty() {
            // stdout was already streamed; only stderr needs repeating
            format!("stderr:\n{}", stderr_str)
        } else {
            "No error output captured".to_string()
        };

        DockerError::BuildFailed {
            code: exit_code,
            reason,
        }
    }
}

/// Outcome of supervising the build process against a deadline.
#[derive(Debug)]
enum WaitOutcome {
    /// The process exited on its own
    Exited {
        status: ExitStatus,
        stderr_lines: Vec<String>,
    },
    /// The deadline passed; the process was killed and reaped
    TimedOut,
}

/// Streams child stdout and waits for exit, all under one wall-clock deadline.
///
/// stdout is forwarded to the operator line by line; stderr is captured in a
/// background task for failure diagnostics. Both the streaming loop and the
/// final wait run against the same deadline, and on timeout the child is
/// killed and reaped before returning.
async fn stream_and_wait(
    mut child: Child,
    deadline: Instant,
    runtime: &RuntimeConfig,
) -> std::io::Result<WaitOutcome> {
    let stderr_handle = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            let mut captured_lines = Vec::new();

            while let Ok(Some(line)) = lines.next_line().await {
                captured_lines.push(line);
            }

            captured_lines
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        let mut lines = reader.lines();

        loop {
            match timeout_at(deadline, lines.next_line()).await {
                Ok(Ok(Some(line))) => runtime.indent(&line),
                // EOF or read error; the exit status decides from here
                Ok(_) => break,
                Err(_elapsed) => {
                    kill_and_reap(&mut child).await;
                    return Ok(WaitOutcome::TimedOut);
                }
            }
        }
    }

    let status = match timeout_at(deadline, child.wait()).await {
        Ok(result) => result?,
        Err(_elapsed) => {
            kill_and_reap(&mut child).await;
            return Ok(WaitOutcome::TimedOut);
        }
    };

    let stderr_lines = match stderr_handle {
        Some(handle) => handle.await.unwrap_or_else(|e| {
            log::warn!("stderr capture task failed: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    Ok(WaitOutcome::Exited {
        status,
        stderr_lines,
    })
}

/// Kill the child (SIGKILL) and reap it with a short bounded wait.
async fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        log::warn!("failed to kill build process: {}", e);
    }
    let _ = tokio::time::timeout(Duration::from_secs(10), child.wait()).await;
}
