//! Linux detection methods: cgroup v2, cgroup v1 and procfs

use super::cgroup::{self, count_cpuset, parse_cpu_max, parse_int, parse_memory_max, quota_cpus};
use super::ResourceProbe;
use crate::error::ProbeError;

impl ResourceProbe {
    pub(super) fn cgroup_v2_cpus(&self) -> Result<i64, ProbeError> {
        let path = self.locator.unified("cpu.max")?;
        let (quota, period) = parse_cpu_max(&cgroup::read("cpu.max", &path)?)?;
        quota_cpus("cpu.max", quota, period)
    }

    pub(super) fn cgroup_v1_cpus(&self) -> Result<i64, ProbeError> {
        let quota_path = self.locator.controller("cpu", "cpu.cfs_quota_us")?;
        let period_path = self.locator.controller("cpu", "cpu.cfs_period_us")?;

        let quota = parse_int(
            "cpu.cfs_quota_us",
            &cgroup::read("cpu.cfs_quota_us", &quota_path)?,
        )?;
        let period = parse_int(
            "cpu.cfs_period_us",
            &cgroup::read("cpu.cfs_period_us", &period_path)?,
        )?;
        quota_cpus("cpu.cfs_quota_us", quota, period)
    }

    pub(super) fn cgroup_cpuset_cpus(&self) -> Result<i64, ProbeError> {
        let path = self.locator.controller("cpuset", "cpuset.cpus")?;
        count_cpuset(&cgroup::read("cpuset.cpus", &path)?)
    }

    pub(super) fn cgroup_v2_memory(&self) -> Result<i64, ProbeError> {
        let path = self.locator.unified("memory.max")?;
        parse_memory_max(&cgroup::read("memory.max", &path)?)
    }

    pub(super) fn cgroup_v1_memory(&self) -> Result<i64, ProbeError> {
        let path = self.locator.controller("memory", "memory.limit_in_bytes")?;
        parse_int(
            "memory.limit_in_bytes",
            &cgroup::read("memory.limit_in_bytes", &path)?,
        )
    }

    pub(super) fn meminfo_total(&self) -> Result<i64, ProbeError> {
        let path = self.config.proc_root.join("meminfo");
        parse_meminfo_total(&cgroup::read("/proc/meminfo", &path)?)
    }
}

/// `MemTotal` from `/proc/meminfo`, converted from kB to bytes
pub fn parse_meminfo_total(content: &str) -> Result<i64, ProbeError> {
    let line = content
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .ok_or_else(|| ProbeError::unavailable("/proc/meminfo", "MemTotal not found"))?;

    let kb = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ProbeError::unavailable("/proc/meminfo", "MemTotal has no value"))?;

    Ok(parse_int("/proc/meminfo", kb)? * 1024)
}
