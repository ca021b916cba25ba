//! Subcommand implementations

pub mod baseline;
pub mod plan;
pub mod probe;
