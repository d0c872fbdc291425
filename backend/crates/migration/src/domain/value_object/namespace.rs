//! Namespace Value Object
//!
//! A namespace is a named collection of independently numbered migrations.
//! The shared layer ships its migrations under `base`; a consuming project
//! adds its own under `project`.
//!
//! ## Invariants
//! - Length: 1 to 64 characters
//! - ASCII lowercase letters, digits, `_` and `-` only

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Maximum namespace length (in characters)
pub const NAMESPACE_MAX_LENGTH: usize = 64;

/// Error returned when namespace validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// Namespace is empty
    Empty,

    /// Namespace is too long (maximum: NAMESPACE_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// Namespace contains invalid character
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Namespace cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "Namespace is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => write!(
                f,
                "Invalid character '{char}' at position {position}. Only a-z, 0-9, _, - are allowed"
            ),
        }
    }
}

impl std::error::Error for NamespaceError {}

/// Validated migration namespace tag
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(Cow<'static, str>);

impl Namespace {
    /// Namespace of the migrations shipped with the shared layer
    pub const BASE: Namespace = Namespace(Cow::Borrowed("base"));

    /// Namespace of the consuming project's migrations
    pub const PROJECT: Namespace = Namespace(Cow::Borrowed("project"));

    /// Create a validated namespace
    pub fn new(input: impl Into<String>) -> Result<Self, NamespaceError> {
        let value = input.into();
        Self::validate(&value)?;
        Ok(Self(Cow::Owned(value)))
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(value: String) -> Self {
        Self(Cow::Owned(value))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), NamespaceError> {
        if value.is_empty() {
            return Err(NamespaceError::Empty);
        }

        let length = value.chars().count();
        if length > NAMESPACE_MAX_LENGTH {
            return Err(NamespaceError::TooLong {
                length,
                max: NAMESPACE_MAX_LENGTH,
            });
        }

        for (position, ch) in value.chars().enumerate() {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-') {
                return Err(NamespaceError::InvalidCharacter { char: ch, position });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Namespace").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Namespace {
    type Error = NamespaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.0.into_owned()
    }
}
