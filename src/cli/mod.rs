//! Command line interface for musl-crossbuild.
//!
//! One linear pipeline: validate arguments, inspect the project manifest,
//! check the Docker daemon, run the build container, verify artifacts. The
//! first failing stage aborts the run.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::docker::{check_docker_available, verify_artifacts, ContainerLimits, ContainerRunner};
use crate::error::{CliError, Result};
use crate::manifest::ProjectInfo;
use crate::target::CrossTarget;
use std::time::Duration;

/// Main CLI entry point. Returns the process exit code.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Runs the full build pipeline for parsed arguments.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::from(&args);

    // Every flag combination goes through from_cli so the bounds checks
    // always apply; detected values anchor whatever the operator left unset
    let detected = ContainerLimits::detect_safe_limits();
    let limits = ContainerLimits::from_cli(
        args.docker_memory.clone().unwrap_or(detected.memory),
        args.docker_memory_swap.clone(),
        args.docker_cpus.clone().or(Some(detected.cpus)),
        args.docker_pids_limit,
    )
    .map_err(|reason| CliError::InvalidArguments { reason })?;

    let project = ProjectInfo::inspect(&args.path)?;
    match &project.package_name {
        Some(name) => runtime.verbose_println(&format!(
            "Project: {} ({} binaries)",
            name,
            project.binaries.len()
        )),
        None => runtime.verbose_println("Project: virtual workspace root"),
    }

    check_docker_available().await?;

    let target = CrossTarget::new(&args.target);
    let runner = ContainerRunner::new(
        project.root.clone(),
        args.image.clone(),
        limits,
        Duration::from_secs(args.timeout_mins * 60),
    );

    runner.run(&target, &runtime).await?;
    verify_artifacts(&project, &target, &runtime)?;

    // The two confirmation lines are the contract of a successful run; they
    // print last, after all tool output, and ignore --quiet
    println!("Build complete.");
    println!("Binaries are in {}/", target.release_dir().display());

    Ok(0)
}
