//! Review rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside the star scale.
    #[error("rating must be between {min} and {max} (got {got})")]
    OutOfRange {
        /// Lowest accepted rating.
        min: u8,
        /// Highest accepted rating.
        max: u8,
        /// Value supplied.
        got: i64,
    },
}

/// A star rating left with a review.
///
/// ## Constraints
///
/// - Whole stars only, from 1 to 5 inclusive
///
/// ## Examples
///
/// ```
/// use mercato_core::Rating;
///
/// assert!(Rating::new(5).is_ok());
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating a shopper can give.
    pub const MIN: u8 = 1;
    /// Highest rating a shopper can give.
    pub const MAX: u8 = 5;

    /// Parse a `Rating` from an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                got: value,
            })
    }

    /// Get the rating as the `SMALLINT` stored in the database.
    #[must_use]
    pub fn as_i16(self) -> i16 {
        i16::from(self.0)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(u8::from(Rating::new(1).unwrap()), 1);
        assert_eq!(u8::from(Rating::new(5).unwrap()), 5);
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert!(Rating::new(i64::MAX).is_err());
    }

    #[test]
    fn test_rating_deserialize_validates() {
        let ok: Result<Rating, _> = serde_json::from_str("4");
        assert_eq!(ok.unwrap().as_i16(), 4);

        let bad: Result<Rating, _> = serde_json::from_str("9");
        assert!(bad.is_err());
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::new(3).unwrap().to_string(), "3/5");
    }
}
