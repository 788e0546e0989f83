//! Year domain of the timeline.
//!
//! The timeline moves in whole years over an inclusive range. Playback
//! advances one year per tick and wraps back to the start after the last
//! year has been shown (2019 -> 2020 -> 1800 with the default range).

use serde::{Deserialize, Serialize};

use super::error::TimelineError;

/// First year of the default timeline
pub const DEFAULT_MIN_YEAR: i32 = 1800;

/// Last year of the default timeline
pub const DEFAULT_MAX_YEAR: i32 = 2020;

/// Year shown when the application starts
pub const DEFAULT_START_YEAR: i32 = 1900;

/// Inclusive year range `[min, max]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_YEAR,
            max: DEFAULT_MAX_YEAR,
        }
    }
}

impl YearRange {
    /// Create a range, rejecting `min > max`.
    pub fn new(min: i32, max: i32) -> Result<Self, TimelineError> {
        if min > max {
            return Err(TimelineError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Nearest year inside the range
    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    /// Fail with `YearOutOfRange` unless `year` lies in the range.
    pub fn check(&self, year: i32) -> Result<i32, TimelineError> {
        if self.contains(year) {
            Ok(year)
        } else {
            Err(TimelineError::YearOutOfRange { year, range: *self })
        }
    }

    /// Year that follows `year` during playback.
    ///
    /// `max` is still returned as a regular step; the step after it wraps to
    /// `min` when `looping`, otherwise there is no next year and `None` is
    /// returned. Years outside the range restart from `min`.
    pub fn next(&self, year: i32, looping: bool) -> Option<i32> {
        if year < self.min || year > self.max {
            return Some(self.min);
        }
        if year == self.max {
            return looping.then_some(self.min);
        }
        Some(year + 1)
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let range = YearRange::default();
        assert_eq!(range.min(), 1800);
        assert_eq!(range.max(), 2020);
        assert!(range.contains(DEFAULT_START_YEAR));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert_eq!(
            YearRange::new(2000, 1999),
            Err(TimelineError::InvalidRange { min: 2000, max: 1999 })
        );
        assert!(YearRange::new(1950, 1950).is_ok());
    }

    #[test]
    fn test_next_shows_last_year_then_wraps() {
        let range = YearRange::default();
        assert_eq!(range.next(1900, true), Some(1901));
        assert_eq!(range.next(2019, true), Some(2020));
        assert_eq!(range.next(2020, true), Some(1800));
    }

    #[test]
    fn test_next_without_loop_ends_at_max() {
        let range = YearRange::default();
        assert_eq!(range.next(2019, false), Some(2020));
        assert_eq!(range.next(2020, false), None);
    }

    #[test]
    fn test_next_restarts_outside_range() {
        let range = YearRange::new(1900, 1910).unwrap();
        assert_eq!(range.next(1700, true), Some(1900));
        assert_eq!(range.next(3000, false), Some(1900));
    }

    #[test]
    fn test_single_year_range_loops_on_itself() {
        let range = YearRange::new(1950, 1950).unwrap();
        assert_eq!(range.next(1950, true), Some(1950));
        assert_eq!(range.next(1950, false), None);
    }

    #[test]
    fn test_check_and_clamp() {
        let range = YearRange::default();
        assert_eq!(range.check(1800), Ok(1800));
        assert_eq!(range.check(2020), Ok(2020));
        assert!(range.check(2021).is_err());
        assert!(range.check(1799).is_err());
        assert_eq!(range.clamp(2100), 2020);
        assert_eq!(range.clamp(1000), 1800);
    }
}
