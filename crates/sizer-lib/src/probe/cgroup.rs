//! cgroup file location and parsing
//!
//! Files are resolved from the process's own membership record
//! (`/proc/self/cgroup`), whose lines have the form
//! `hierarchy-ID:controller-list:cgroup-path`:
//! - cgroup v2: the single entry with an empty controller list, e.g. `0::/docker/abc`
//! - cgroup v1: one entry per hierarchy, e.g. `4:cpu,cpuacct:/docker/abc`

use crate::error::ProbeError;
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel written by the kernel when no v2 limit is configured
const UNLIMITED: &str = "max";

/// One line of the membership record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupEntry {
    pub hierarchy_id: String,
    pub controllers: Vec<String>,
    pub path: String,
}

impl CgroupEntry {
    pub fn is_unified(&self) -> bool {
        self.controllers.is_empty()
    }
}

/// Resolves cgroup interface files for the current process
#[derive(Debug, Clone)]
pub struct CgroupLocator {
    cgroup_root: PathBuf,
    membership_path: PathBuf,
}

impl CgroupLocator {
    pub fn new(cgroup_root: impl Into<PathBuf>, proc_root: impl AsRef<Path>) -> Self {
        Self {
            cgroup_root: cgroup_root.into(),
            membership_path: proc_root.as_ref().join("self").join("cgroup"),
        }
    }

    /// Parse membership record contents, skipping malformed lines
    pub fn parse_membership(content: &str) -> Vec<CgroupEntry> {
        content
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.splitn(3, ':').collect();
                if parts.len() != 3 {
                    return None;
                }
                Some(CgroupEntry {
                    hierarchy_id: parts[0].to_string(),
                    controllers: parts[1]
                        .split(',')
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect(),
                    path: parts[2].to_string(),
                })
            })
            .collect()
    }

    fn read_membership(&self, file: &str) -> Result<Vec<CgroupEntry>, ProbeError> {
        let content = fs::read_to_string(&self.membership_path).map_err(|e| {
            ProbeError::unavailable(
                file,
                format!("cannot read {}: {}", self.membership_path.display(), e),
            )
        })?;
        Ok(Self::parse_membership(&content))
    }

    /// Path of `file` in the unified (v2) hierarchy
    pub fn unified(&self, file: &str) -> Result<PathBuf, ProbeError> {
        let entry = self
            .read_membership(file)?
            .into_iter()
            .find(CgroupEntry::is_unified)
            .ok_or_else(|| ProbeError::unavailable(file, "unified cgroup entry not found"))?;

        existing(file, self.cgroup_root.join(relative(&entry.path)).join(file))
    }

    /// Path of `file` under a v1 controller hierarchy
    pub fn controller(&self, controller: &str, file: &str) -> Result<PathBuf, ProbeError> {
        let entry = self
            .read_membership(file)?
            .into_iter()
            .find(|e| e.controllers.iter().any(|c| c == controller))
            .ok_or_else(|| {
                ProbeError::unavailable(
                    file,
                    format!("controller {} not in {}", controller, self.membership_path.display()),
                )
            })?;

        existing(
            file,
            self.cgroup_root
                .join(controller)
                .join(relative(&entry.path))
                .join(file),
        )
    }
}

fn relative(cgroup_path: &str) -> &str {
    cgroup_path.trim_start_matches('/')
}

fn existing(file: &str, path: PathBuf) -> Result<PathBuf, ProbeError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ProbeError::unavailable(
            file,
            format!("{} does not exist", path.display()),
        ))
    }
}

/// Read a file, labelling failures with the interface file name
pub fn read(file: &str, path: &Path) -> Result<String, ProbeError> {
    fs::read_to_string(path)
        .map_err(|e| ProbeError::unavailable(file, format!("cannot read {}: {}", path.display(), e)))
}

/// Parse a single trimmed integer value
pub fn parse_int(file: &str, content: &str) -> Result<i64, ProbeError> {
    let trimmed = content.trim();
    trimmed
        .parse()
        .map_err(|_| ProbeError::unavailable(file, format!("not an integer: {:?}", trimmed)))
}

/// Parse `cpu.max` contents (`"<quota> <period>"`)
pub fn parse_cpu_max(content: &str) -> Result<(i64, i64), ProbeError> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(ProbeError::unavailable("cpu.max", "expected quota and period"));
    }
    if fields[0] == UNLIMITED {
        return Err(ProbeError::unavailable("cpu.max", "no v2 CPU quota set"));
    }
    Ok((parse_int("cpu.max", fields[0])?, parse_int("cpu.max", fields[1])?))
}

/// Parse `memory.max` contents
pub fn parse_memory_max(content: &str) -> Result<i64, ProbeError> {
    if content.trim() == UNLIMITED {
        return Err(ProbeError::unavailable("memory.max", "no v2 memory limit"));
    }
    parse_int("memory.max", content)
}

/// Whole CPUs granted by a quota, when both values are positive
pub fn quota_cpus(file: &str, quota: i64, period: i64) -> Result<i64, ProbeError> {
    if quota <= 0 || period <= 0 {
        return Err(ProbeError::unavailable(file, "no CPU quota set"));
    }
    Ok(quota / period)
}

/// Count CPUs in a cpuset list such as `"0-3,6,8-9"`
pub fn count_cpuset(set: &str) -> Result<i64, ProbeError> {
    let set = set.trim();
    if set.is_empty() {
        return Err(ProbeError::unavailable("cpuset.cpus", "empty cpuset"));
    }

    let invalid = |segment: &str| {
        ProbeError::unavailable("cpuset.cpus", format!("invalid cpuset segment {:?}", segment))
    };

    let mut ranges = Vec::new();
    for segment in set.split(',') {
        let range = match segment.split_once('-') {
            Some((start, end)) => {
                let start: u64 = start.parse().map_err(|_| invalid(segment))?;
                let end: u64 = end.parse().map_err(|_| invalid(segment))?;
                if end < start {
                    return Err(invalid(segment));
                }
                (start, end)
            }
            None => {
                let cpu: u64 = segment.parse().map_err(|_| invalid(segment))?;
                (cpu, cpu)
            }
        };
        ranges.push((range.0, range.1, segment));
    }

    // Overlapping segments count each CPU once
    ranges.sort_unstable();
    let mut count = 0u64;
    let mut covered_to: Option<u64> = None;
    for (start, end, segment) in ranges {
        let from = match covered_to {
            Some(prev) if prev >= end => continue,
            Some(prev) if prev >= start => prev + 1,
            _ => start,
        };
        count = (end - from)
            .checked_add(1)
            .and_then(|span| count.checked_add(span))
            .ok_or_else(|| invalid(segment))?;
        covered_to = Some(end);
    }

    i64::try_from(count).map_err(|_| invalid(set))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_membership_v2() {
        let entries = CgroupLocator::parse_membership("0::/docker/abc123\n");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_unified());
        assert_eq!(entries[0].path, "/docker/abc123");
    }

    #[test]
    fn test_parse_membership_v1() {
        let content = r#"12:memory:/docker/abc
4:cpu,cpuacct:/docker/abc
3:cpuset:/docker/abc
1:name=systemd:/init.scope
garbage line
"#;
        let entries = CgroupLocator::parse_membership(content);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1].controllers, vec!["cpu", "cpuacct"]);
        assert!(!entries.iter().any(CgroupEntry::is_unified));
    }

    #[test]
    fn test_parse_membership_keeps_colons_in_path() {
        let entries = CgroupLocator::parse_membership("0::/kubepods/pod:with:colons");
        assert_eq!(entries[0].path, "/kubepods/pod:with:colons");
    }

    #[test]
    fn test_parse_cpu_max() {
        assert_eq!(parse_cpu_max("200000 100000\n").unwrap(), (200000, 100000));
        assert!(parse_cpu_max("max 100000").is_err());
        assert!(parse_cpu_max("150000").is_err());
        assert!(parse_cpu_max("abc 100000").is_err());
        assert!(parse_cpu_max("").is_err());
    }

    #[test]
    fn test_parse_memory_max() {
        assert_eq!(parse_memory_max("4294967296\n").unwrap(), 4294967296);
        assert!(parse_memory_max("max\n").is_err());
        assert!(parse_memory_max("lots").is_err());
    }

    #[test]
    fn test_quota_cpus() {
        assert_eq!(quota_cpus("cpu.max", 200000, 100000).unwrap(), 2);
        assert_eq!(quota_cpus("cpu.max", 250000, 100000).unwrap(), 2);
        assert_eq!(quota_cpus("cpu.max", 50000, 100000).unwrap(), 0);
        assert!(quota_cpus("cpu.cfs_quota_us", -1, 100000).is_err());
        assert!(quota_cpus("cpu.cfs_quota_us", 100000, 0).is_err());
    }

    #[test]
    fn test_count_cpuset() {
        assert_eq!(count_cpuset("0-3,6,8-9").unwrap(), 7);
        assert_eq!(count_cpuset("0-3").unwrap(), 4);
        assert_eq!(count_cpuset("0").unwrap(), 1);
        assert_eq!(count_cpuset("0-63\n").unwrap(), 64);
        assert_eq!(count_cpuset("5,5").unwrap(), 1);
        assert_eq!(count_cpuset("0-3,2-5").unwrap(), 6);
        assert_eq!(count_cpuset("0-7,2-3").unwrap(), 8);
    }

    #[test]
    fn test_count_cpuset_rejects_invalid() {
        assert!(count_cpuset("").is_err());
        assert!(count_cpuset("  \n").is_err());
        assert!(count_cpuset("3-1").is_err());
        assert!(count_cpuset("a-b").is_err());
        assert!(count_cpuset("0-3,x").is_err());
        assert!(count_cpuset("0-3,").is_err());
        assert!(count_cpuset("-1").is_err());
    }

    #[test]
    fn test_count_cpuset_rejects_oversized_ranges() {
        assert!(count_cpuset("0-18446744073709551615").is_err());
        assert!(count_cpuset("0-9223372036854775807").is_err());
        assert!(
            count_cpuset("0-9223372036854775806,9223372036854775807-18446744073709551614").is_err()
        );
        assert_eq!(count_cpuset("0-9223372036854775806").unwrap(), i64::MAX);
    }
}
