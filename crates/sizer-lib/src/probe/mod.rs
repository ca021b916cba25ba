//! Detection of the CPU and memory available to containers
//!
//! Each resource is detected by an ordered chain of independent methods;
//! the first one yielding a positive value wins and every failure is kept
//! so the caller sees why a value is missing:
//! - Linux: cgroup v2, then cgroup v1, then host-wide sources
//! - macOS / Windows: Docker Desktop configuration via `docker info`
//! - anything else: host CPU count only

mod cgroup;
mod command;
mod desktop;
mod linux;


pub use cgroup::{count_cpuset, parse_cpu_max, CgroupEntry, CgroupLocator};
pub use command::{command_label, CommandRunner, SystemCommandRunner};
pub use linux::parse_meminfo_total;

use crate::error::ProbeError;
use crate::models::{Platform, SystemInfo};
use std::path::PathBuf;
use tracing::debug;

/// Filesystem and binary locations used by the probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Mount point of the cgroup filesystem
    pub cgroup_root: PathBuf,
    /// Mount point of procfs
    pub proc_root: PathBuf,
    /// Container runtime CLI queried on desktop hosts
    pub runtime_bin: String,
    /// Host system-information command (macOS memory fallback)
    pub sysctl_bin: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cgroup_root: PathBuf::from("/sys/fs/cgroup"),
            proc_root: PathBuf::from("/proc"),
            runtime_bin: "docker".to_string(),
            sysctl_bin: "sysctl".to_string(),
        }
    }
}

/// Probe outcome: always a usable `SystemInfo`, plus every failure seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub info: SystemInfo,
    pub error: Option<ProbeError>,
}

impl ProbeReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> (SystemInfo, Result<(), ProbeError>) {
        let result = match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        };
        (self.info, result)
    }
}

type Method = fn(&ResourceProbe) -> Result<i64, ProbeError>;

const LINUX_CPU: &[(&str, Method)] = &[
    ("cgroup v2 cpu.max", ResourceProbe::cgroup_v2_cpus),
    ("cgroup v1 cfs quota", ResourceProbe::cgroup_v1_cpus),
    ("cgroup v1 cpuset", ResourceProbe::cgroup_cpuset_cpus),
    ("logical CPUs", ResourceProbe::logical_cpus),
];

const LINUX_MEMORY: &[(&str, Method)] = &[
    ("cgroup v2 memory.max", ResourceProbe::cgroup_v2_memory),
    ("cgroup v1 memory limit", ResourceProbe::cgroup_v1_memory),
    ("/proc/meminfo", ResourceProbe::meminfo_total),
];

const MAC_MEMORY: &[(&str, Method)] = &[
    ("docker info", ResourceProbe::runtime_memory),
    ("sysctl hw.memsize", ResourceProbe::sysctl_memory),
];

const WINDOWS_MEMORY: &[(&str, Method)] = &[
    ("docker info", ResourceProbe::runtime_memory),
    ("host memory", ResourceProbe::host_memory_unsupported),
];

/// Platform-aware resource detector
pub struct ResourceProbe {
    config: ProbeConfig,
    platform: Platform,
    locator: CgroupLocator,
    runner: Box<dyn CommandRunner>,
}

impl ResourceProbe {
    pub fn new(
        config: ProbeConfig,
        platform: Platform,
        runner: impl CommandRunner + 'static,
    ) -> Self {
        let locator = CgroupLocator::new(&config.cgroup_root, &config.proc_root);
        Self {
            config,
            platform,
            locator,
            runner: Box::new(runner),
        }
    }

    /// Probe for the current host with default locations
    pub fn system() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Probe for the current host with custom locations
    pub fn with_config(config: ProbeConfig) -> Self {
        Self::new(config, Platform::current(), SystemCommandRunner)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Detect CPU and memory; never fails, see [`ProbeReport`]
    pub fn probe(&self) -> ProbeReport {
        let mut failures = Vec::new();

        let cpu_count = match self.cpu_count() {
            Ok(cpus) => cpus,
            Err(ProbeError::Degraded { fallback, reason }) => {
                failures.push(ProbeError::Degraded { fallback, reason }.to_string());
                fallback
            }
            Err(err) => {
                failures.extend(err.messages());
                0
            }
        };

        let ram_bytes = match self.ram_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                failures.extend(err.messages());
                0
            }
        };

        ProbeReport {
            info: SystemInfo::new(cpu_count, ram_bytes),
            error: (!failures.is_empty()).then_some(ProbeError::Exhausted(failures)),
        }
    }

    /// CPUs available to containers
    ///
    /// On desktop hosts a failed runtime query still yields the host CPU
    /// count, carried in [`ProbeError::Degraded`].
    pub fn cpu_count(&self) -> Result<i64, ProbeError> {
        match self.platform {
            Platform::Linux => self.first_positive("cpu", LINUX_CPU),
            Platform::MacOs | Platform::Windows => match self.runtime_cpus() {
                Ok(cpus) if cpus > 0 => Ok(cpus),
                Ok(cpus) => Err(ProbeError::Degraded {
                    fallback: logical_cpu_count(),
                    reason: format!("docker info reported {} CPUs", cpus),
                }),
                Err(err) => Err(ProbeError::Degraded {
                    fallback: logical_cpu_count(),
                    reason: err.to_string(),
                }),
            },
            Platform::Other => Ok(logical_cpu_count()),
        }
    }

    /// Memory ceiling for containers, in bytes
    pub fn ram_bytes(&self) -> Result<i64, ProbeError> {
        match self.platform {
            Platform::Linux => self.first_positive("memory", LINUX_MEMORY),
            Platform::MacOs => self.first_positive("memory", MAC_MEMORY),
            Platform::Windows => self.first_positive("memory", WINDOWS_MEMORY),
            Platform::Other => Err(ProbeError::Unsupported(self.platform.to_string())),
        }
    }

    fn first_positive(
        &self,
        resource: &str,
        chain: &[(&str, Method)],
    ) -> Result<i64, ProbeError> {
        let mut failures = Vec::with_capacity(chain.len());

        for (method, detect) in chain {
            match detect(self) {
                Ok(value) if value > 0 => {
                    debug!(
                        event = "probe_method_selected",
                        resource,
                        method,
                        value,
                        "Detected {}",
                        resource
                    );
                    return Ok(value);
                }
                Ok(value) => {
                    debug!(
                        event = "probe_method_skipped",
                        resource,
                        method,
                        value,
                        "Detection method returned a non-positive value"
                    );
                    failures.push(format!("{} returned {}", method, value));
                }
                Err(err) => {
                    debug!(
                        event = "probe_method_failed",
                        resource,
                        method,
                        error = %err,
                        "Detection method failed"
                    );
                    failures.push(err.to_string());
                }
            }
        }

        Err(ProbeError::Exhausted(failures))
    }

    fn logical_cpus(&self) -> Result<i64, ProbeError> {
        Ok(logical_cpu_count())
    }
}

/// Logical CPUs visible to this process
pub fn logical_cpu_count() -> i64 {
    num_cpus::get() as i64
}
