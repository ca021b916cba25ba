//! Allocation plan command
//!
//! Turns the detected (or overridden) capacity into per-service limits and
//! reservations, refusing hosts below the configured memory floor.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;
use sizer_lib::observability::StructuredLogger;
use sizer_lib::units::{format_mem, gib_to_mib, mib_to_gib_ceil, parse_mem};
use sizer_lib::{scale, AllocationTable, Baseline, SystemInfo};
use tabled::Tabled;

use crate::commands::probe::detect;
use crate::config::Config;
use crate::output::{format_cpu, print_json, print_success, print_warning, OutputFormat};

/// User overrides applied on top of the probe result
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Total memory, e.g. `"20g"`
    pub memory: Option<String>,
    pub cpus: Option<f64>,
    pub min_ram_gb: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub total_memory_mib: i64,
    pub total_cpu: f64,
    pub services: AllocationTable,
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "CPU Limit")]
    cpu_limit: String,
    #[tabled(rename = "Mem Limit")]
    memory_limit: String,
    #[tabled(rename = "CPU Reservation")]
    cpu_reservation: String,
    #[tabled(rename = "Mem Reservation")]
    memory_reservation: String,
}

/// Compute the plan for a probed host
pub fn build_plan(
    info: &SystemInfo,
    options: &PlanOptions,
    min_ram_gb: i64,
    logger: &StructuredLogger,
) -> Result<Plan> {
    let (total_memory_mib, ram_gb) = match &options.memory {
        Some(memory) => {
            let mib = parse_mem(memory).with_context(|| format!("Invalid --memory {:?}", memory))?;
            (mib, mib_to_gib_ceil(mib))
        }
        None => (gib_to_mib(info.ram_gb), info.ram_gb),
    };

    if ram_gb < min_ram_gb {
        logger.log_insufficient_memory(ram_gb, min_ram_gb);
        bail!(
            "insufficient RAM: {} GB detected, at least {} GB is recommended",
            ram_gb,
            min_ram_gb
        );
    }

    let total_cpu = options.cpus.unwrap_or(info.cpu_count as f64);
    if total_cpu.is_nan() || total_cpu <= 0.0 {
        bail!("no CPUs available for containers");
    }

    let services = scale(&Baseline::reference(), total_memory_mib, total_cpu)?;
    logger.log_plan(total_memory_mib, total_cpu, services.len());

    Ok(Plan {
        total_memory_mib,
        total_cpu,
        services,
    })
}

/// Probe the host and print the scaled allocation table
pub fn show_plan(config: &Config, options: &PlanOptions, format: OutputFormat) -> Result<()> {
    let (probe, report) = detect(config);
    if let Some(err) = &report.error {
        for message in err.messages() {
            print_warning(&message);
        }
    }

    let logger = StructuredLogger::new(probe.platform());
    let min_ram_gb = options.min_ram_gb.unwrap_or(config.min_ram_gb);
    let plan = build_plan(&report.info, options, min_ram_gb, &logger)?;

    match format {
        OutputFormat::Json => print_json(&plan)?,
        OutputFormat::Table => {
            print_success(&format!(
                "Allocating {} CPUs and {} across {} services",
                format_cpu(plan.total_cpu),
                format_mem(plan.total_memory_mib),
                plan.services.len()
            ));
            print_allocations(&plan.services);
        }
    }

    Ok(())
}

/// Render an allocation table
pub fn print_allocations(services: &AllocationTable) {
    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|(name, r)| ServiceRow {
            service: name.cyan().to_string(),
            cpu_limit: format_cpu(r.limits.cpu),
            memory_limit: format_mem(r.limits.memory_mib),
            cpu_reservation: format_cpu(r.reservations.cpu),
            memory_reservation: format_mem(r.reservations.memory_mib),
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}
