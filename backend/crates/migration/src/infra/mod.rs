//! Infrastructure Layer
//!
//! Database implementation and filesystem migration sources.

pub mod postgres;
pub mod sql_directory;

pub use postgres::{PgMigrationStore, PgMigrationTx};
pub use sql_directory::{SqlDirectorySource, SqlMigration};
