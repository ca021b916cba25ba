//! Baseline table command

use anyhow::Result;
use colored::Colorize;
use sizer_lib::units::format_mem;
use sizer_lib::{AllocationTable, Baseline};

use crate::commands::plan::print_allocations;
use crate::output::{print_json, OutputFormat};

/// Print the reference allocation every plan is scaled from
pub fn show_baseline(format: OutputFormat) -> Result<()> {
    let baseline = Baseline::reference();
    let table: AllocationTable = baseline
        .services()
        .map(|(name, r)| (name.to_string(), *r))
        .collect();

    match format {
        OutputFormat::Json => print_json(&table)?,
        OutputFormat::Table => {
            println!("{}", "Baseline allocation".bold());
            print_allocations(&table);
            println!(
                "\nTotals: {} CPUs, {}",
                baseline.cpu_total(),
                format_mem(baseline.memory_total_mib())
            );
        }
    }

    Ok(())
}
