//! CLI integration tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn compose_sizer(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_compose-sizer"));
    // Keep the user's config file and environment out of the tests
    cmd.env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("COMPOSE_SIZER_CGROUP_ROOT")
        .env_remove("COMPOSE_SIZER_PROC_ROOT")
        .env_remove("COMPOSE_SIZER_RUNTIME_BIN")
        .env_remove("COMPOSE_SIZER_SYSCTL_BIN")
        .env_remove("COMPOSE_SIZER_MIN_RAM_GB")
        .env_remove("COMPOSE_SIZER_LOG_FORMAT");
    cmd
}

/// Mock cgroup v2 host limited to `cpus` CPUs and `memory_bytes` of memory
fn mock_v2_host(cpus: i64, memory_bytes: i64) -> TempDir {
    let dir = TempDir::new().unwrap();
    let scope = dir.path().join("cgroup/system.slice/docker-abc.scope");
    fs::create_dir_all(&scope).unwrap();
    fs::create_dir_all(dir.path().join("proc/self")).unwrap();

    fs::write(
        dir.path().join("proc/self/cgroup"),
        "0::/system.slice/docker-abc.scope\n",
    )
    .unwrap();
    fs::write(scope.join("cpu.max"), format!("{} 100000\n", cpus * 100000)).unwrap();
    fs::write(scope.join("memory.max"), format!("{}\n", memory_bytes)).unwrap();
    dir
}

fn run_on_host(host: &TempDir, args: &[&str]) -> Output {
    compose_sizer(host.path())
        .env("COMPOSE_SIZER_CGROUP_ROOT", host.path().join("cgroup"))
        .env("COMPOSE_SIZER_PROC_ROOT", host.path().join("proc"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = compose_sizer(home.path())
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("probe"), "Should show probe command");
    assert!(stdout.contains("plan"), "Should show plan command");
    assert!(stdout.contains("baseline"), "Should show baseline command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = compose_sizer(home.path())
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "CLI version should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("compose-sizer"));
}

/// Test plan subcommand help
#[test]
fn test_plan_help() {
    let home = TempDir::new().unwrap();
    let output = compose_sizer(home.path())
        .args(["plan", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--memory"), "Should show memory option");
    assert!(stdout.contains("--cpus"), "Should show cpus option");
    assert!(stdout.contains("--min-ram-gb"), "Should show floor option");
}

#[test]
fn test_baseline_json() {
    let home = TempDir::new().unwrap();
    let output = compose_sizer(home.path())
        .args(["--format", "json", "baseline"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["alfresco"]["limits"]["memory_mib"], 3072);
    assert_eq!(json.as_object().unwrap().len(), 9);
}

#[cfg(target_os = "linux")]
#[test]
fn test_probe_json_on_mock_host() {
    let host = mock_v2_host(4, 16 << 30);
    let output = run_on_host(&host, &["--format", "json", "probe"]);

    assert!(output.status.success(), "{:?}", output);
    let json = stdout_json(&output);
    assert_eq!(json["platform"], "linux");
    assert_eq!(json["system"]["cpu_count"], 4);
    assert_eq!(json["system"]["ram_gb"], 16);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_plan_json_on_mock_host() {
    let host = mock_v2_host(4, 16 << 30);
    let output = run_on_host(&host, &["--format", "json", "plan"]);

    assert!(output.status.success(), "{:?}", output);
    let json = stdout_json(&output);
    assert_eq!(json["total_memory_mib"], 16384);
    assert_eq!(json["total_cpu"], 4.0);

    let services = json["services"].as_object().unwrap();
    assert_eq!(services.len(), 9);
    let memory: i64 = services
        .values()
        .map(|s| s["limits"]["memory_mib"].as_i64().unwrap())
        .sum();
    assert!(memory <= 16384 && memory >= 16384 - 8, "{memory}");
}

#[cfg(target_os = "linux")]
#[test]
fn test_plan_refuses_small_host() {
    let host = mock_v2_host(2, 4 << 30);
    let output = run_on_host(&host, &["plan"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("insufficient RAM"), "{stderr}");
}

#[cfg(target_os = "linux")]
#[test]
fn test_plan_floor_from_environment() {
    let host = mock_v2_host(2, 4 << 30);
    let output = compose_sizer(host.path())
        .env("COMPOSE_SIZER_CGROUP_ROOT", host.path().join("cgroup"))
        .env("COMPOSE_SIZER_PROC_ROOT", host.path().join("proc"))
        .env("COMPOSE_SIZER_MIN_RAM_GB", "4")
        .args(["--format", "json", "plan"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout_json(&output)["total_memory_mib"], 4096);
}

#[cfg(target_os = "linux")]
#[test]
fn test_plan_overrides() {
    let host = mock_v2_host(2, 4 << 30);
    let output = run_on_host(
        &host,
        &["--format", "json", "plan", "--memory", "20g", "--cpus", "6"],
    );

    assert!(output.status.success(), "{:?}", output);
    let json = stdout_json(&output);
    assert_eq!(json["total_memory_mib"], 20480);
    assert_eq!(json["total_cpu"], 6.0);
}
