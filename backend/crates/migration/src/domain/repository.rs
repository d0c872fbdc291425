//! Repository Traits
//!
//! Interfaces for transaction scoping and the migrations ledger.
//! Implementation is in infrastructure layer.

use crate::domain::entity::ledger_entry::LedgerEntry;
use crate::domain::migration::MigrationTx;
use crate::domain::value_object::migration_key::MigrationKey;
use crate::error::MigrateResult;

/// Transaction source
///
/// Every `begin` opens a fresh transaction; the connection behind it goes
/// back to the pool on `commit` or `rollback`.
#[trait_variant::make(Database: Send)]
pub trait LocalDatabase {
    /// Transaction handle handed to migrations
    type Tx: MigrationTx + 'static;

    /// Open a new transaction
    async fn begin(&self) -> MigrateResult<Self::Tx>;

    /// Commit a transaction
    async fn commit(&self, tx: Self::Tx) -> MigrateResult<()>;

    /// Roll back a transaction
    async fn rollback(&self, tx: Self::Tx) -> MigrateResult<()>;
}

/// Migrations ledger
///
/// Source of truth for "already applied". The `(namespace, sequence number)`
/// uniqueness constraint is the only guard against concurrent runners.
#[trait_variant::make(MigrationLedger: Send)]
pub trait LocalMigrationLedger: Database {
    /// Create the ledger table if absent (safe on every startup)
    async fn ensure_table(&self) -> MigrateResult<()>;

    /// All recorded entries, oldest first
    async fn list_executed(&self) -> MigrateResult<Vec<LedgerEntry>>;

    /// Insert one entry through the migration's own transaction
    ///
    /// Fails with `MigrateError::LedgerConflict` if the key is already recorded.
    async fn record(
        &self,
        tx: &mut Self::Tx,
        key: &MigrationKey,
        display_name: &str,
    ) -> MigrateResult<()>;
}
