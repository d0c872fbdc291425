//! Migration Backend Module
//!
//! Forward-only schema migrations for the auth/profile layer.
//!
//! Clean Architecture structure:
//! - `domain/` - Migration contract, entities, value objects, repository traits
//! - `application/` - Loader, run and status use cases
//! - `infra/` - PostgreSQL ledger, SQL directory source
//! - `migrations/` - Base layer migrations
//!
//! ## Execution Model
//! - Migrations come from namespaces (`base`, then `project`), each numbered independently
//! - Every pending migration runs in its own transaction together with its ledger insert
//! - The first failure aborts the run; a re-run continues where it stopped
//! - Concurrent runners are resolved by the ledger's `(namespace, sequence_number)` constraint

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod migrations;

// Re-exports for convenience
pub use application::{
    MigrationCatalog, MigrationConfig, MigrationRegistry, MigrationStatus,
    MigrationStatusUseCase, RunMigrationsUseCase, RunReport,
};
pub use domain::{Migration, MigrationKey, MigrationTx, Namespace};
pub use error::{MigrateError, MigrateResult};
pub use infra::{PgMigrationStore, SqlDirectorySource};
pub use migrations::base_registry;
