//! Ledger Entry Entity
//!
//! One row of the migrations ledger. Created once, when the migration's
//! transaction commits, and never updated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_object::migration_key::MigrationKey;

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// `(namespace, sequence number)`, unique in the ledger
    pub key: MigrationKey,
    /// Name at execution time (audit only, not compared to the definition)
    pub display_name: String,
    /// Set by the store at insertion
    pub executed_at: DateTime<Utc>,
}
