//! Validated serialization percentage (0 to 100 inclusive).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Rejected percentage input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentageError {
    #[error("serialization must be a number between 0 and 100, got {0}")]
    OutOfRange(i64),

    #[error("serialization must be a whole number between 0 and 100, got '{0}'")]
    NotANumber(String),
}

impl PercentageError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidPercentage
    }
}

/// Target share of functions that must sit in a dependency chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// # Errors
    ///
    /// Returns [`PercentageError::OutOfRange`] outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, PercentageError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(PercentageError::OutOfRange(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// `ceil(total * self / 100)`.
    #[must_use]
    pub const fn share_of(self, total: usize) -> usize {
        (total * self.0 as usize).div_ceil(100)
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<i64> for Percentage {
    type Error = PercentageError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

impl FromStr for Percentage {
    type Err = PercentageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| PercentageError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Percentage::new(0), Ok(Percentage::ZERO));
        assert_eq!(Percentage::new(100), Ok(Percentage::FULL));
        assert_eq!("  42 ".parse::<Percentage>().map(Percentage::get), Ok(42));
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Percentage::new(101), Err(PercentageError::OutOfRange(101)));
        assert_eq!(Percentage::new(-1), Err(PercentageError::OutOfRange(-1)));
        assert!(matches!(
            "150".parse::<Percentage>(),
            Err(PercentageError::OutOfRange(150))
        ));
    }

    #[test]
    fn rejects_non_numbers() {
        assert!(matches!(
            "half".parse::<Percentage>(),
            Err(PercentageError::NotANumber(_))
        ));
        assert!(matches!(
            "12.5".parse::<Percentage>(),
            Err(PercentageError::NotANumber(_))
        ));
    }

    #[test]
    fn share_rounds_up() {
        let p = |v| Percentage::new(v).expect("valid");
        assert_eq!(p(100).share_of(3), 3);
        assert_eq!(p(50).share_of(4), 2);
        assert_eq!(p(50).share_of(3), 2);
        assert_eq!(p(1).share_of(3), 1);
        assert_eq!(p(0).share_of(7), 0);
        assert_eq!(p(100).share_of(0), 0);
    }

    #[test]
    fn error_maps_to_code() {
        let err = Percentage::new(200).expect_err("out of range");
        assert_eq!(err.error_code(), ErrorCode::InvalidPercentage);
        assert!(err.to_string().contains("between 0 and 100"));
    }

    #[test]
    fn displays_with_percent_sign() {
        assert_eq!(Percentage::new(75).expect("valid").to_string(), "75%");
    }
}
