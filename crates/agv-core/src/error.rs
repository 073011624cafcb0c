//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use std::fmt::Display;
use std::ops::RangeInclusive;

use thiserror::Error;

/// The base error type for `agv-core` and a common building block for
/// sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{what} must be in {min}..={max}, got {value}")]
    OutOfRange {
        what:  &'static str,
        value: String,
        min:   String,
        max:   String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `agv-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Reject `value` unless it lies inside `range`.
///
/// NaN never lies inside any range, so float settings are checked for
/// finiteness by the same call.
pub fn check_range<T>(what: &'static str, value: T, range: RangeInclusive<T>) -> CoreResult<()>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        return Ok(());
    }
    Err(CoreError::OutOfRange {
        what,
        value: value.to_string(),
        min:   range.start().to_string(),
        max:   range.end().to_string(),
    })
}
