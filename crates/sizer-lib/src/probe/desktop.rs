//! Docker Desktop detection methods (macOS and Windows)
//!
//! Containers run inside a VM whose size is configured in Docker Desktop,
//! so the runtime is asked directly rather than the host.

use super::command::command_label;
use super::ResourceProbe;
use crate::error::ProbeError;

const NCPU_TEMPLATE: &str = "{{.NCPU}}";
const MEM_TOTAL_TEMPLATE: &str = "{{.MemTotal}}";

impl ResourceProbe {
    pub(super) fn runtime_cpus(&self) -> Result<i64, ProbeError> {
        self.runtime_info(NCPU_TEMPLATE)
    }

    pub(super) fn runtime_memory(&self) -> Result<i64, ProbeError> {
        self.runtime_info(MEM_TOTAL_TEMPLATE)
    }

    pub(super) fn sysctl_memory(&self) -> Result<i64, ProbeError> {
        let args = ["-n", "hw.memsize"];
        let out = self.runner.run(&self.config.sysctl_bin, &args)?;
        parse_command_int(&command_label(&self.config.sysctl_bin, &args), &out)
    }

    pub(super) fn host_memory_unsupported(&self) -> Result<i64, ProbeError> {
        Err(ProbeError::unavailable(
            "host memory query",
            format!("not implemented for {}", self.platform),
        ))
    }

    /// `docker info --format <template>` parsed as an integer
    fn runtime_info(&self, template: &str) -> Result<i64, ProbeError> {
        let args = ["info", "--format", template];
        let out = self.runner.run(&self.config.runtime_bin, &args)?;
        parse_command_int(&command_label(&self.config.runtime_bin, &args), &out)
    }
}

fn parse_command_int(label: &str, output: &str) -> Result<i64, ProbeError> {
    let trimmed = output.trim();
    trimmed
        .parse()
        .map_err(|_| ProbeError::unavailable(label, format!("unexpected output {:?}", trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_int() {
        assert_eq!(parse_command_int("docker info", "8\n").unwrap(), 8);
        assert_eq!(
            parse_command_int("docker info", " 8232370176 \n").unwrap(),
            8232370176
        );
        let err = parse_command_int("docker info", "<no value>").unwrap_err();
        assert!(err.to_string().contains("unexpected output"));
    }
}
