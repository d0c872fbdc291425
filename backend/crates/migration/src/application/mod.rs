//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod loader;
pub mod migration_status;
pub mod plan;
pub mod run_migrations;

// Re-exports
pub use config::MigrationConfig;
pub use loader::{MigrationCandidate, MigrationCatalog, MigrationRegistry, MigrationSource};
pub use migration_status::{MigrationStatus, MigrationStatusUseCase};
pub use plan::MigrationPlan;
pub use run_migrations::{RunMigrationsUseCase, RunReport};
