//! Migration Error Types
//!
//! Fatal errors of a migration run. Non-fatal load problems (bad identifiers,
//! id mismatches, broken candidates) are logged by the loader and never
//! reach this type.

use thiserror::Error;

use crate::domain::value_object::migration_key::MigrationKey;

/// Migration result type alias
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Migration error variants
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Two loaded definitions share `(namespace, sequence number)`
    #[error("Duplicate migration {key}: '{first}' and '{second}'")]
    DuplicateDefinition {
        key: MigrationKey,
        first: String,
        second: String,
    },

    /// Migration failed; its transaction was rolled back
    #[error("Migration {key} ({name}) failed: {source}")]
    Apply {
        key: MigrationKey,
        name: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// Ledger already holds this migration (concurrent runner won the race)
    #[error("Migration {key} ({name}) is already recorded in the ledger")]
    LedgerConflict { key: MigrationKey, name: String },

    /// `revert` called on a migration without a down step
    #[error("Migration {key} ({name}) is not reversible")]
    RevertUnsupported { key: MigrationKey, name: String },

    /// Invalid runner configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A source could not turn a candidate into a migration
    #[error("Failed to load migration: {0}")]
    Load(String),

    /// Raised by migration code
    #[error("Statement failed: {0}")]
    Statement(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MigrateError {
    /// Migration the error is about, when there is one
    pub fn key(&self) -> Option<&MigrationKey> {
        match self {
            MigrateError::DuplicateDefinition { key, .. }
            | MigrateError::Apply { key, .. }
            | MigrateError::LedgerConflict { key, .. }
            | MigrateError::RevertUnsupported { key, .. } => Some(key),
            MigrateError::InvalidConfig(_)
            | MigrateError::Load(_)
            | MigrateError::Statement(_)
            | MigrateError::Database(_) => None,
        }
    }

    /// Whether this is the expected outcome of two runners racing
    pub fn is_conflict(&self) -> bool {
        matches!(self, MigrateError::LedgerConflict { .. })
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            MigrateError::LedgerConflict { key, name } => {
                tracing::warn!(
                    migration = %key,
                    name = %name,
                    "Migration already applied by another runner, re-run to continue"
                );
            }
            MigrateError::Apply { key, name, source } => {
                tracing::error!(
                    migration = %key,
                    name = %name,
                    error = %source,
                    "Migration failed and was rolled back, fix it and re-run"
                );
            }
            MigrateError::DuplicateDefinition { key, first, second } => {
                tracing::error!(
                    migration = %key,
                    first = %first,
                    second = %second,
                    "Duplicate migration definition, nothing was executed"
                );
            }
            _ => {
                tracing::error!(error = %self, "Migration error");
            }
        }
    }
}
