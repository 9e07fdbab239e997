use crate::aircraft::Status;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        value: u64,
        min: u64,
    },
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("timing `{field}` has min {min}ms greater than max {max}ms")]
    InvertedSpan {
        field: &'static str,
        min: u64,
        max: u64,
    },
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("setup prompt failed: {0}")]
    Prompt(#[from] rustyline::error::ReadlineError),
    #[error("setup cancelled")]
    Cancelled,
}

/// Rejected aircraft state change. The caller decides how to absorb it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot enter the runway while {0}")]
    MidExcursion(Status),
    #[error("cannot switch status while {0}")]
    NotToggleable(Status),
    #[error("cannot park while already parked")]
    AlreadyParked,
}

/// Returned by a full container, handing the item back to the caller.
#[derive(Debug, Error)]
#[error("holding area is full")]
pub struct Full<T>(pub T);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("holding area is empty")]
pub struct Empty;
