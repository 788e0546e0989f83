//! Timeline errors.

use super::year::YearRange;

/// Errors raised by the timeline core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Year lies outside the configured range
    YearOutOfRange { year: i32, range: YearRange },
    /// Widget or console input could not be read as a year
    NotANumber(String),
    /// Attribute name is not usable inside a filter predicate
    InvalidField(String),
    /// Range with `min > max`
    InvalidRange { min: i32, max: i32 },
}

impl std::fmt::Display for TimelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimelineError::YearOutOfRange { year, range } => {
                write!(f, "Year {} is outside the timeline range {}", year, range)
            }
            TimelineError::NotANumber(input) => write!(f, "Not a year: {:?}", input),
            TimelineError::InvalidField(name) => {
                write!(f, "Invalid year attribute name: {:?}", name)
            }
            TimelineError::InvalidRange { min, max } => {
                write!(f, "Invalid year range: {} is after {}", min, max)
            }
        }
    }
}

impl std::error::Error for TimelineError {}
