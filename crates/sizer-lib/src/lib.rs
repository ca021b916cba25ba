//! Sizing library for Docker Compose resource allocation
//!
//! This crate provides the core functionality for:
//! - Detecting the CPU and memory available to containers on this host
//! - Scaling a fixed baseline of service allocations to that capacity
//! - Formatting and parsing Compose memory quantities

pub mod error;
pub mod models;
pub mod observability;
pub mod probe;
pub mod scale;
pub mod units;

pub use error::{ProbeError, ScaleError, UnitError};
pub use models::*;
pub use probe::{
    CgroupLocator, CommandRunner, ProbeConfig, ProbeReport, ResourceProbe, SystemCommandRunner,
};
pub use scale::{scale, Baseline};
