//! Sequence Number Value Object
//!
//! Ordering key of a migration inside its namespace. Stored in an
//! `INTEGER` column, so the upper bound is `i32::MAX`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a sequence number is out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceNumberError {
    /// Zero is reserved (sequence numbers start at 1)
    Zero,

    /// Does not fit in the ledger column
    TooLarge { value: u64 },
}

impl fmt::Display for SequenceNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "Sequence number must be positive"),
            Self::TooLarge { value } => {
                write!(f, "Sequence number {value} exceeds maximum {}", i32::MAX)
            }
        }
    }
}

impl std::error::Error for SequenceNumberError {}

/// Positive migration sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u32")]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    pub fn new(value: u64) -> Result<Self, SequenceNumberError> {
        if value == 0 {
            return Err(SequenceNumberError::Zero);
        }
        if value > i32::MAX as u64 {
            return Err(SequenceNumberError::TooLarge { value });
        }
        Ok(Self(value as u32))
    }

    /// Create from database values (assumes already validated)
    #[inline]
    pub fn from_db(value: i32) -> Self {
        Self(value.max(0) as u32)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Value for binding to the ledger's `INTEGER` column
    #[inline]
    pub const fn as_i32(&self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for SequenceNumber {
    type Error = SequenceNumberError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SequenceNumber> for u32 {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(SequenceNumber::new(0), Err(SequenceNumberError::Zero));
        assert_eq!(SequenceNumber::new(1).unwrap().get(), 1);
        assert_eq!(
            SequenceNumber::new(i32::MAX as u64).unwrap().as_i32(),
            i32::MAX
        );
        assert!(matches!(
            SequenceNumber::new(i32::MAX as u64 + 1),
            Err(SequenceNumberError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_ordering() {
        let two = SequenceNumber::new(2).unwrap();
        let ten = SequenceNumber::new(10).unwrap();
        assert!(two < ten);
    }
}
