//! Memory quantity helpers for Compose files

use crate::error::UnitError;

pub const MIB_PER_GIB: i64 = 1024;
pub const BYTES_PER_GIB: i64 = 1 << 30;

/// Format MiB in Compose notation: whole GiB as `"<n>g"`, otherwise `"<n>m"`
pub fn format_mem(mib: i64) -> String {
    if mib % MIB_PER_GIB == 0 {
        format!("{}g", mib / MIB_PER_GIB)
    } else {
        format!("{}m", mib)
    }
}

/// Parse a human memory size such as `"20g"` or `"512MB"` into MiB
pub fn parse_mem(input: &str) -> Result<i64, UnitError> {
    let s = input.trim().to_ascii_lowercase();

    let (number, scale) = if let Some(n) = s.strip_suffix("gb").or_else(|| s.strip_suffix('g')) {
        (n, MIB_PER_GIB)
    } else if let Some(n) = s.strip_suffix("mb").or_else(|| s.strip_suffix('m')) {
        (n, 1)
    } else {
        return Err(UnitError::MissingSuffix);
    };

    let value: i64 = number
        .trim()
        .parse()
        .map_err(|_| UnitError::InvalidNumber(number.trim().to_string()))?;
    if value < 0 {
        return Err(UnitError::InvalidNumber(number.trim().to_string()));
    }

    value
        .checked_mul(scale)
        .ok_or_else(|| UnitError::InvalidNumber(number.trim().to_string()))
}

pub fn gib_to_mib(gb: i64) -> i64 {
    gb * MIB_PER_GIB
}

/// Whole GiB needed to hold `bytes`; non-positive input is 0
pub fn bytes_to_gib_ceil(bytes: i64) -> i64 {
    ceil_div(bytes, BYTES_PER_GIB)
}

/// Whole GiB needed to hold `mib`; non-positive input is 0
pub fn mib_to_gib_ceil(mib: i64) -> i64 {
    ceil_div(mib, MIB_PER_GIB)
}

fn ceil_div(value: i64, unit: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    value / unit + i64::from(value % unit != 0)
}
