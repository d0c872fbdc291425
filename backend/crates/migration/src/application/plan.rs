//! Migration Plan
//!
//! Diff between loaded definitions and the ledger. Shared by the run and
//! status use cases so both agree on what "pending" means.

use std::collections::HashSet;

use crate::domain::entity::{definition::MigrationDefinition, ledger_entry::LedgerEntry};
use crate::domain::value_object::migration_key::MigrationKey;

#[derive(Debug)]
pub struct MigrationPlan {
    executed: Vec<MigrationKey>,
    pending: Vec<MigrationDefinition>,
    total: usize,
}

impl MigrationPlan {
    /// `definitions` must already be in run order (namespace priority, then sequence)
    pub fn new(definitions: Vec<MigrationDefinition>, executed: Vec<LedgerEntry>) -> Self {
        let executed: Vec<MigrationKey> = executed.into_iter().map(|entry| entry.key).collect();
        let done: HashSet<&MigrationKey> = executed.iter().collect();

        let total = definitions.len();
        let pending = definitions
            .into_iter()
            .filter(|definition| !done.contains(&definition.key))
            .collect();

        Self {
            executed,
            pending,
            total,
        }
    }

    /// Keys recorded in the ledger, in ledger order
    pub fn executed(&self) -> &[MigrationKey] {
        &self.executed
    }

    /// Definitions still to run, in run order
    pub fn pending(&self) -> &[MigrationDefinition] {
        &self.pending
    }

    /// Number of loaded definitions
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}
