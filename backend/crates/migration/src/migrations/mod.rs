//! Base Migrations
//!
//! Schema of the shared auth/profile layer, registered under the `base`
//! namespace. Every step checks the current schema first, so running them
//! against a database created by hand is harmless.

mod add_email_change_fields;
mod create_initial_tables;
mod create_password_reset_table;

pub use add_email_change_fields::AddEmailChangeFields;
pub use create_initial_tables::CreateInitialTables;
pub use create_password_reset_table::CreatePasswordResetTable;

use crate::application::loader::MigrationRegistry;
use crate::domain::value_object::namespace::Namespace;

/// Registry of the base layer's migrations
pub fn base_registry() -> MigrationRegistry {
    MigrationRegistry::new(Namespace::BASE)
        .register::<CreateInitialTables>("001_create_initial_tables")
        .register::<AddEmailChangeFields>("002_add_email_change_fields")
        .register::<CreatePasswordResetTable>("003_create_password_reset_table")
}
