//! Error types for probing, scaling and unit parsing

use thiserror::Error;

/// Failure of one detection method, or of a whole detection chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// A single method could not produce a value on this host
    #[error("{method} unavailable: {reason}")]
    Unavailable { method: String, reason: String },

    /// Detection fell back to a less accurate source; the value is still usable
    #[error("{reason} - falling back to {fallback} host CPUs")]
    Degraded { fallback: i64, reason: String },

    #[error("unsupported OS {0}")]
    Unsupported(String),

    /// Every method failed; messages are kept in attempt order
    #[error("{}", .0.join("; "))]
    Exhausted(Vec<String>),
}

impl ProbeError {
    pub fn unavailable(method: impl Into<String>, reason: impl ToString) -> Self {
        ProbeError::Unavailable {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// Flatten into individual messages for aggregation
    pub fn messages(&self) -> Vec<String> {
        match self {
            ProbeError::Exhausted(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    #[error("baseline memory total is zero")]
    ZeroBaselineMemory,

    #[error("baseline CPU total is zero")]
    ZeroBaselineCpu,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("use m/mb or g/gb")]
    MissingSuffix,

    #[error("cannot parse {0:?}")]
    InvalidNumber(String),
}
