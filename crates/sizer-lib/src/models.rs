//! Core data models shared by the probe and the scaler

use serde::{Deserialize, Serialize};
use crate::units::bytes_to_gib_ceil;
use std::collections::BTreeMap;

/// Resources the host makes available to containers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub cpu_count: i64,
    pub ram_bytes: i64,
    /// `ram_bytes` rounded up to whole GiB
    pub ram_gb: i64,
}

impl SystemInfo {
    pub fn new(cpu_count: i64, ram_bytes: i64) -> Self {
        Self {
            cpu_count,
            ram_bytes,
            ram_gb: bytes_to_gib_ceil(ram_bytes),
        }
    }
}

/// A single CPU / memory pair, used for either limits or reservations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMem {
    pub cpu: f64,
    pub memory_mib: i64,
}

impl CpuMem {
    pub const fn new(cpu: f64, memory_mib: i64) -> Self {
        Self { cpu, memory_mib }
    }
}

/// Full allocation for one named service
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub limits: CpuMem,
    pub reservations: CpuMem,
}

/// Service name to scaled allocation, ordered by service name
pub type AllocationTable = BTreeMap<String, Resource>;

/// Operating system family the probe is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    #[serde(rename = "mac")]
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    pub fn is_linux(self) -> bool {
        self == Platform::Linux
    }

    pub fn is_mac(self) -> bool {
        self == Platform::MacOs
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }

    /// Docker Desktop hosts, where containers run inside a managed VM
    pub fn is_desktop(self) -> bool {
        matches!(self, Platform::MacOs | Platform::Windows)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::MacOs => "mac",
            Platform::Windows => "windows",
            Platform::Other => "other",
        };
        f.write_str(name)
    }
}
