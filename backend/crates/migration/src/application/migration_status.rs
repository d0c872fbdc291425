//! Migration Status Use Case
//!
//! Same load and diff as a run, without executing anything.
//! Used for diagnostics and health checks.

use std::sync::Arc;

use serde::Serialize;

use crate::application::loader::MigrationCatalog;
use crate::application::plan::MigrationPlan;
use crate::domain::repository::MigrationLedger;
use crate::domain::value_object::migration_key::MigrationKey;
use crate::error::MigrateResult;

/// Status output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Keys recorded in the ledger
    pub executed: Vec<MigrationKey>,
    /// Keys that a run would apply, in run order
    pub pending: Vec<MigrationKey>,
    /// Number of loaded definitions
    pub total: usize,
}

/// Migration status use case
pub struct MigrationStatusUseCase<L>
where
    L: MigrationLedger,
{
    ledger: Arc<L>,
    catalog: Arc<MigrationCatalog>,
}

impl<L> MigrationStatusUseCase<L>
where
    L: MigrationLedger,
{
    pub fn new(ledger: Arc<L>, catalog: Arc<MigrationCatalog>) -> Self {
        Self { ledger, catalog }
    }

    pub async fn execute(&self) -> MigrateResult<MigrationStatus> {
        self.ledger.ensure_table().await?;

        let definitions = self.catalog.load()?;
        let executed = self.ledger.list_executed().await?;
        let plan = MigrationPlan::new(definitions, executed);

        let status = MigrationStatus {
            executed: plan.executed().to_vec(),
            pending: plan.pending().iter().map(|d| d.key.clone()).collect(),
            total: plan.total(),
        };

        tracing::debug!(
            executed = status.executed.len(),
            pending = status.pending.len(),
            total = status.total,
            "Migration status"
        );

        Ok(status)
    }
}
