//! Migration Contract
//!
//! Migrations are trait objects so namespaces can mix statically registered
//! Rust migrations with SQL files. Both traits here are object safe, hence
//! `async_trait` rather than native async fns.

use async_trait::async_trait;

use crate::error::{MigrateError, MigrateResult};

/// Transaction handle passed to `up`/`down`
///
/// Everything done through it commits or rolls back together with the
/// ledger insert for the migration.
#[async_trait]
pub trait MigrationTx: Send {
    /// Execute one or more SQL statements
    async fn execute(&mut self, sql: &str) -> MigrateResult<()>;

    /// Check whether a table exists in the configured schema
    async fn table_exists(&mut self, table: &str) -> MigrateResult<bool>;

    /// Check whether a column exists on a table in the configured schema
    async fn column_exists(&mut self, table: &str, column: &str) -> MigrateResult<bool>;
}

/// A single forward migration
#[async_trait]
pub trait Migration: Send + Sync {
    /// Sequence number; must match the number in the migration's identifier
    fn id(&self) -> u64;

    /// Human-readable description
    fn name(&self) -> &str;

    /// Forward operation
    async fn up(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()>;

    /// Whether `down` is implemented
    fn is_reversible(&self) -> bool {
        false
    }

    /// Inverse operation. Only called when `is_reversible` returns true.
    async fn down(&self, _tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        Err(MigrateError::Statement(format!(
            "Down migration not implemented for migration {}",
            self.id()
        )))
    }
}
