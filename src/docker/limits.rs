//! Resource limits for the build container.
//!
//! Controls memory, CPU, and process limits so a runaway build cannot
//! exhaust the host.

use sysinfo::System;

/// Resource limits applied to the build container.
#[derive(Debug, Clone)]
pub struct ContainerLimits {
    /// Maximum memory (e.g., "4g", "2048m")
    pub memory: String,

    /// Maximum memory + swap (e.g., "6g", "3072m")
    pub memory_swap: String,

    /// Number of CPUs (fractional allowed, e.g., "2", "1.5")
    pub cpus: String,

    /// Maximum number of processes
    pub pids_limit: u32,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self::detect_safe_limits()
    }
}

impl ContainerLimits {
    /// Detects safe resource limits from host capabilities.
    ///
    /// Conservative defaults: half the total RAM (clamped to 2..16 GB),
    /// swap = memory + 2 GB, half the cores (minimum 2), 1000 PIDs.
    pub fn detect_safe_limits() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let total_ram_gb = sys.total_memory() / 1024 / 1024 / 1024;
        let memory_gb = (total_ram_gb / 2).clamp(2, 16);
        let swap_gb = memory_gb + 2;

        let total_cpus = num_cpus::get();
        let cpu_limit = (total_cpus / 2).max(2);

        Self {
            memory: format!("{}g", memory_gb),
            memory_swap: format!("{}g", swap_gb),
            cpus: cpu_limit.to_string(),
            pids_limit: 1000,
        }
    }

    /// Parse a memory string like "4g", "4096m", "4G", "2048M" to megabytes.
    fn parse_memory_to_mb(memory: &str) -> Result<u64, String> {
        let memory = memory.trim().to_lowercase();

        if let Some(stripped) = memory.strip_suffix("gb") {
            let val: u64 = stripped
                .parse()
                .map_err(|_| format!("Invalid memory value: {}", memory))?;
            Ok(val * 1024)
        } else if let Some(stripped) = memory.strip_suffix("g") {
            let val: u64 = stripped
                .parse()
                .map_err(|_| format!("Invalid memory value: {}", memory))?;
            Ok(val * 1024)
        } else if let Some(stripped) = memory.strip_suffix("mb") {
            stripped
                .parse()
                .map_err(|_| format!("Invalid memory value: {}", memory))
        } else if let Some(stripped) = memory.strip_suffix("m") {
            stripped
                .parse()
                .map_err(|_| format!("Invalid memory value: {}", memory))
        } else {
            // No unit - assume megabytes
            memory
                .parse()
                .map_err(|_| format!("Invalid memory value: {}", memory))
        }
    }

    /// Creates limits from CLI arguments.
    ///
    /// Validates that memory_swap >= memory and that every limit stays in a
    /// sane range for a cargo build.
    pub fn from_cli(
        memory: String,
        memory_swap: Option<String>,
        cpus: Option<String>,
        pids_limit: u32,
    ) -> Result<Self, String> {
        let memory_mb = Self::parse_memory_to_mb(&memory)?;

        // Docker's floor is 4MB; cross builds need far more than that
        if memory_mb < 512 {
            return Err(format!(
                "Memory limit too low: {} MB (minimum: 512 MB)\n\
                 Containerized cargo builds need significant memory.",
                memory_mb
            ));
        }

        if memory_mb > 1024 * 1024 {
            return Err(format!(
                "Memory limit too high: {} MB (maximum: 1 TB)",
                memory_mb
            ));
        }

        let memory_swap = if let Some(swap) = memory_swap {
            let swap_mb = Self::parse_memory_to_mb(&swap)?;

            if swap_mb < memory_mb {
                return Err(format!(
                    "Memory swap ({} MB) must be >= memory ({} MB)",
                    swap_mb, memory_mb
                ));
            }

            format!("{}m", swap_mb)
        } else {
            // Default: memory + 2GB
            format!("{}m", memory_mb + 2048)
        };

        let cpus = if let Some(cpus_str) = cpus {
            let cpus_f32: f32 = cpus_str.parse().map_err(|_| {
                format!(
                    "Invalid --docker-cpus value: '{}' (expected number like '2' or '1.5')",
                    cpus_str
                )
            })?;

            if cpus_f32 <= 0.0 {
                return Err(format!("CPU limit must be positive, got: {}", cpus_f32));
            }

            if cpus_f32 > 1024.0 {
                return Err(format!("CPU limit too high: {} (maximum: 1024)", cpus_f32));
            }

            cpus_str
        } else {
            num_cpus::get().to_string()
        };

        if pids_limit < 10 {
            return Err(format!(
                "PID limit too low: {} (minimum: 10)\n\
                 Builds require multiple processes.",
                pids_limit
            ));
        }

        if pids_limit > 1_000_000 {
            return Err(format!(
                "PID limit too high: {} (maximum: 1,000,000)",
                pids_limit
            ));
        }

        Ok(Self {
            memory, // Keep original format for Docker
            memory_swap,
            cpus,
            pids_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_memory_gigabyte_suffixes() {
        assert_eq!(ContainerLimits::parse_memory_to_mb("4g"), Ok(4096));
        assert_eq!(ContainerLimits::parse_memory_to_mb("4G"), Ok(4096));
        assert_eq!(ContainerLimits::parse_memory_to_mb("4gb"), Ok(4096));
        assert_eq!(ContainerLimits::parse_memory_to_mb("4GB"), Ok(4096));
    }

    #[test]
    fn parse_memory_megabyte_suffixes() {
        assert_eq!(ContainerLimits::parse_memory_to_mb("4096m"), Ok(4096));
        assert_eq!(ContainerLimits::parse_memory_to_mb("4096M"), Ok(4096));
        assert_eq!(ContainerLimits::parse_memory_to_mb("4096mb"), Ok(4096));
    }

    #[test]
    fn parse_memory_no_unit_means_megabytes() {
        assert_eq!(ContainerLimits::parse_memory_to_mb("2048"), Ok(2048));
    }

    #[test]
    fn parse_memory_tolerates_whitespace() {
        assert_eq!(ContainerLimits::parse_memory_to_mb("  4g  "), Ok(4096));
    }

    #[test]
    fn parse_memory_rejects_garbage() {
        assert!(ContainerLimits::parse_memory_to_mb("invalid").is_err());
        assert!(ContainerLimits::parse_memory_to_mb("4x").is_err());
    }

    #[test]
    fn from_cli_default_swap_is_memory_plus_two_gb() {
        let limits = ContainerLimits::from_cli("4g".to_string(), None, None, 1000)
            .expect("4g should be valid");
        assert_eq!(limits.memory_swap, "6144m");
    }

    #[test]
    fn from_cli_default_swap_converts_megabyte_input() {
        // "4096m" is 4GB, so default swap is 6GB = 6144MB
        let limits = ContainerLimits::from_cli("4096m".to_string(), None, None, 1000)
            .expect("4096m should be valid");
        assert_eq!(limits.memory_swap, "6144m");
    }

    #[test]
    fn from_cli_rejects_swap_below_memory() {
        let result =
            ContainerLimits::from_cli("8g".to_string(), Some("4g".to_string()), None, 1000);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("must be >="));
    }

    #[test]
    fn from_cli_accepts_swap_equal_to_memory() {
        assert!(
            ContainerLimits::from_cli("4g".to_string(), Some("4g".to_string()), None, 1000)
                .is_ok()
        );
    }

    #[test]
    fn from_cli_preserves_original_memory_format() {
        let limits =
            ContainerLimits::from_cli("4g".to_string(), Some("6g".to_string()), None, 1000)
                .expect("valid limits");
        assert_eq!(limits.memory, "4g");
    }

    #[test]
    fn from_cli_memory_bounds() {
        let low = ContainerLimits::from_cli("100m".to_string(), None, None, 1000);
        assert!(low.unwrap_err().contains("512 MB"));

        let high = ContainerLimits::from_cli("2000000m".to_string(), None, None, 1000);
        assert!(high.unwrap_err().contains("1 TB"));
    }

    #[test]
    fn from_cli_cpu_validation() {
        assert!(
            ContainerLimits::from_cli("4g".to_string(), None, Some("abc".to_string()), 1000)
                .is_err()
        );
        assert!(
            ContainerLimits::from_cli("4g".to_string(), None, Some("0".to_string()), 1000)
                .is_err()
        );
        assert!(
            ContainerLimits::from_cli("4g".to_string(), None, Some("9999".to_string()), 1000)
                .is_err()
        );
        assert!(
            ContainerLimits::from_cli("4g".to_string(), None, Some("1.5".to_string()), 1000)
                .is_ok()
        );
    }

    #[test]
    fn from_cli_pid_bounds() {
        assert!(ContainerLimits::from_cli("4g".to_string(), None, None, 0).is_err());
        assert!(ContainerLimits::from_cli("4g".to_string(), None, None, 5_000_000).is_err());
        assert!(ContainerLimits::from_cli("4g".to_string(), None, None, 500).is_ok());
    }

    #[test]
    fn detected_defaults_are_within_bounds() {
        let limits = ContainerLimits::detect_safe_limits();
        assert!(limits.memory.ends_with('g'));
        assert_eq!(limits.pids_limit, 1000);
    }
}
