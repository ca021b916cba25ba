//! Resource detection command

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sizer_lib::observability::StructuredLogger;
use sizer_lib::{ProbeReport, ResourceProbe, SystemInfo};
use tabled::Tabled;

use crate::config::Config;
use crate::output::{format_bytes, print_json, print_warning, OutputFormat};

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Resource")]
    name: &'static str,
    #[tabled(rename = "Available")]
    value: String,
}

#[derive(Serialize)]
struct ProbeOutput<'a> {
    platform: String,
    system: &'a SystemInfo,
    warnings: Vec<String>,
}

/// Run the probe configured by `config`, logging the outcome
pub fn detect(config: &Config) -> (ResourceProbe, ProbeReport) {
    let probe = ResourceProbe::with_config(config.probe_config());
    let report = probe.probe();
    StructuredLogger::new(probe.platform()).log_probe(&report);
    (probe, report)
}

/// Print the resources available to containers
pub fn show_resources(config: &Config, format: OutputFormat) -> Result<()> {
    let (probe, report) = detect(config);
    let warnings = report
        .error
        .as_ref()
        .map(|e| e.messages())
        .unwrap_or_default();

    match format {
        OutputFormat::Json => print_json(&ProbeOutput {
            platform: probe.platform().to_string(),
            system: &report.info,
            warnings,
        })?,
        OutputFormat::Table => {
            println!("{}", "Resources available for containers".bold());
            println!("Platform: {}", probe.platform().to_string().cyan());

            let rows = vec![
                ResourceRow {
                    name: "CPUs",
                    value: report.info.cpu_count.to_string(),
                },
                ResourceRow {
                    name: "Memory",
                    value: format_bytes(report.info.ram_bytes),
                },
                ResourceRow {
                    name: "Memory (GB, rounded up)",
                    value: report.info.ram_gb.to_string(),
                },
            ];
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            for warning in &warnings {
                print_warning(warning);
            }
        }
    }

    Ok(())
}
