//! Domain Layer
//!
//! Contains entities, value objects, the migration contract and repository traits.

pub mod entity;
pub mod migration;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{definition::MigrationDefinition, ledger_entry::LedgerEntry};
pub use migration::{Migration, MigrationTx};
pub use repository::{Database, MigrationLedger};
pub use value_object::{
    migration_identifier::MigrationIdentifier, migration_key::MigrationKey, namespace::Namespace,
    sequence_number::SequenceNumber,
};
