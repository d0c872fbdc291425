//! Migration Definition Entity
//!
//! A loaded, validated migration bound to its namespace.

use std::fmt;
use std::sync::Arc;

use crate::domain::migration::{Migration, MigrationTx};
use crate::domain::value_object::migration_key::MigrationKey;
use crate::error::{MigrateError, MigrateResult};

#[derive(Clone)]
pub struct MigrationDefinition {
    pub key: MigrationKey,
    pub display_name: String,
    migration: Arc<dyn Migration>,
}

impl MigrationDefinition {
    pub fn new(key: MigrationKey, migration: Arc<dyn Migration>) -> Self {
        Self {
            key,
            display_name: migration.name().to_string(),
            migration,
        }
    }

    /// Run the forward operation inside the caller's transaction
    pub async fn apply(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        self.migration.up(tx).await
    }

    /// Run the inverse operation inside the caller's transaction
    ///
    /// Fails with [`MigrateError::RevertUnsupported`] without touching the
    /// transaction when the migration has no down step.
    pub async fn revert(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        if !self.migration.is_reversible() {
            return Err(MigrateError::RevertUnsupported {
                key: self.key.clone(),
                name: self.display_name.clone(),
            });
        }
        self.migration.down(tx).await
    }

    pub fn is_reversible(&self) -> bool {
        self.migration.is_reversible()
    }
}

impl fmt::Debug for MigrationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationDefinition")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("reversible", &self.is_reversible())
            .finish()
    }
}
