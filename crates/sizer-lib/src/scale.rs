//! Proportional allocation of host capacity across Compose services
//!
//! Every service keeps the share of CPU and memory it has in the baseline
//! table. Memory is truncated to whole MiB so the sum never exceeds the
//! target; CPU is rounded to two decimals and may overshoot slightly.

use crate::error::ScaleError;
use crate::models::{AllocationTable, CpuMem, Resource};
use std::collections::BTreeMap;
use tracing::debug;

/// Reference allocation describing the relative weight of each service
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    services: BTreeMap<String, Resource>,
}

impl Baseline {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Resource)>,
        S: Into<String>,
    {
        Self {
            services: entries
                .into_iter()
                .map(|(name, resource)| (name.into(), resource))
                .collect(),
        }
    }

    /// The fixed table for the Alfresco Compose topology
    pub fn reference() -> Self {
        fn entry(
            name: &'static str,
            limit: (f64, i64),
            reservation: (f64, i64),
        ) -> (&'static str, Resource) {
            (
                name,
                Resource {
                    limits: CpuMem::new(limit.0, limit.1),
                    reservations: CpuMem::new(reservation.0, reservation.1),
                },
            )
        }

        Self::new([
            entry("database", (1.0, 1024), (0.5, 512)),
            entry("activemq", (1.0, 1024), (0.5, 512)),
            entry("transform-core-aio", (2.0, 2048), (1.0, 1024)),
            entry("alfresco", (2.0, 3072), (1.0, 2048)),
            entry("solr6", (2.0, 1536), (1.0, 768)),
            entry("share", (1.0, 1024), (0.5, 512)),
            entry("content-app", (0.5, 512), (0.25, 256)),
            entry("control-center", (0.5, 512), (0.25, 256)),
            entry("proxy", (0.5, 512), (0.25, 256)),
        ])
    }

    pub fn services(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.services.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn get(&self, service: &str) -> Option<&Resource> {
        self.services.get(service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Sum of limit memory across all services
    pub fn memory_total_mib(&self) -> i64 {
        self.services.values().map(|r| r.limits.memory_mib).sum()
    }

    /// Sum of limit CPU across all services
    pub fn cpu_total(&self) -> f64 {
        self.services.values().map(|r| r.limits.cpu).sum()
    }
}

/// Scale every baseline entry so limit totals match the given capacity
pub fn scale(
    baseline: &Baseline,
    target_memory_mib: i64,
    target_cpu: f64,
) -> Result<AllocationTable, ScaleError> {
    let baseline_mem = baseline.memory_total_mib();
    if baseline_mem == 0 {
        return Err(ScaleError::ZeroBaselineMemory);
    }
    let baseline_cpu = baseline.cpu_total();
    if baseline_cpu == 0.0 {
        return Err(ScaleError::ZeroBaselineCpu);
    }

    let mem_factor = target_memory_mib as f64 / baseline_mem as f64;
    let cpu_factor = target_cpu / baseline_cpu;
    debug!(
        event = "scale",
        target_memory_mib,
        target_cpu,
        mem_factor,
        cpu_factor,
        services = baseline.len(),
        "Scaling baseline allocation"
    );

    let scale_pair = |pair: &CpuMem| CpuMem {
        cpu: round_cpu(pair.cpu * cpu_factor),
        memory_mib: (pair.memory_mib as f64 * mem_factor) as i64,
    };

    Ok(baseline
        .services
        .iter()
        .map(|(name, r)| {
            (
                name.clone(),
                Resource {
                    limits: scale_pair(&r.limits),
                    reservations: scale_pair(&r.reservations),
                },
            )
        })
        .collect())
}

/// Round to two decimals, halves away from zero
fn round_cpu(cpu: f64) -> f64 {
    (cpu * 100.0).round() / 100.0
}
