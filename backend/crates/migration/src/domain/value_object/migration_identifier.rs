//! Migration Identifier Value Object
//!
//! Identifiers follow `<digits>_<description>`, e.g. `001_create_initial_tables`.
//! The numeric prefix becomes the sequence number (leading zeros allowed),
//! the rest is kept as the description.

use std::fmt;

use crate::domain::value_object::sequence_number::{SequenceNumber, SequenceNumberError};

/// Error returned when an identifier does not follow `<digits>_<description>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationIdentifierError {
    /// No leading digits
    MissingNumber,

    /// Digits are not followed by `_`
    MissingSeparator,

    /// Nothing after the separator
    MissingDescription,

    /// Numeric prefix is not a valid sequence number
    InvalidNumber(SequenceNumberError),
}

impl fmt::Display for MigrationIdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNumber => write!(f, "Identifier must start with a number"),
            Self::MissingSeparator => {
                write!(f, "Identifier number must be followed by '_'")
            }
            Self::MissingDescription => write!(f, "Identifier has no description"),
            Self::InvalidNumber(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MigrationIdentifierError {}

/// Parsed `<digits>_<description>` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationIdentifier {
    sequence: SequenceNumber,
    description: String,
}

impl MigrationIdentifier {
    pub fn parse(input: &str) -> Result<Self, MigrationIdentifierError> {
        let digits_end = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        if digits_end == 0 {
            return Err(MigrationIdentifierError::MissingNumber);
        }

        let (digits, rest) = input.split_at(digits_end);
        let description = rest
            .strip_prefix('_')
            .ok_or(MigrationIdentifierError::MissingSeparator)?;
        if description.is_empty() {
            return Err(MigrationIdentifierError::MissingDescription);
        }

        // More digits than u64 holds is still "too large", not malformed
        let value = digits.parse::<u64>().unwrap_or(u64::MAX);
        let sequence =
            SequenceNumber::new(value).map_err(MigrationIdentifierError::InvalidNumber)?;

        Ok(Self {
            sequence,
            description: description.to_string(),
        })
    }

    #[inline]
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description with `_` replaced by spaces, for display names
    pub fn humanized(&self) -> String {
        self.description.replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zero_padded() {
        let id = MigrationIdentifier::parse("001_create_initial_tables").unwrap();
        assert_eq!(id.sequence().get(), 1);
        assert_eq!(id.description(), "create_initial_tables");
        assert_eq!(id.humanized(), "create initial tables");
    }

    #[test]
    fn test_parse_keeps_inner_underscores_and_digits() {
        let id = MigrationIdentifier::parse("42_add_2fa_columns").unwrap();
        assert_eq!(id.sequence().get(), 42);
        assert_eq!(id.description(), "add_2fa_columns");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            MigrationIdentifier::parse("create_users"),
            Err(MigrationIdentifierError::MissingNumber)
        );
        assert_eq!(
            MigrationIdentifier::parse("001-create"),
            Err(MigrationIdentifierError::MissingSeparator)
        );
        assert_eq!(
            MigrationIdentifier::parse("001"),
            Err(MigrationIdentifierError::MissingSeparator)
        );
        assert_eq!(
            MigrationIdentifier::parse("001_"),
            Err(MigrationIdentifierError::MissingDescription)
        );
        assert_eq!(
            MigrationIdentifier::parse(""),
            Err(MigrationIdentifierError::MissingNumber)
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range_numbers() {
        assert_eq!(
            MigrationIdentifier::parse("000_init"),
            Err(MigrationIdentifierError::InvalidNumber(
                SequenceNumberError::Zero
            ))
        );
        assert!(matches!(
            MigrationIdentifier::parse("99999999999999999999999_huge"),
            Err(MigrationIdentifierError::InvalidNumber(
                SequenceNumberError::TooLarge { .. }
            ))
        ));
    }
}
