//! Run Migrations Use Case
//!
//! Applies every pending migration, one transaction each, in run order.
//!
//! ## Failure policy
//! - The migration and its ledger insert commit together or not at all
//! - The first failure aborts the run; later migrations are not attempted
//! - Everything before the failure stays committed, so a re-run resumes there

use std::sync::Arc;

use serde::Serialize;

use crate::application::loader::MigrationCatalog;
use crate::application::plan::MigrationPlan;
use crate::domain::entity::definition::MigrationDefinition;
use crate::domain::repository::MigrationLedger;
use crate::domain::value_object::migration_key::MigrationKey;
use crate::error::{MigrateError, MigrateResult};

/// Run output
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Migrations applied by this run, in order
    pub applied: Vec<MigrationKey>,
}

/// Run migrations use case
pub struct RunMigrationsUseCase<L>
where
    L: MigrationLedger,
{
    ledger: Arc<L>,
    catalog: Arc<MigrationCatalog>,
}

impl<L> RunMigrationsUseCase<L>
where
    L: MigrationLedger,
{
    pub fn new(ledger: Arc<L>, catalog: Arc<MigrationCatalog>) -> Self {
        Self { ledger, catalog }
    }

    pub async fn execute(&self) -> MigrateResult<RunReport> {
        tracing::info!("Checking for pending migrations");

        self.ledger.ensure_table().await?;

        let definitions = self.catalog.load()?;
        if definitions.is_empty() {
            tracing::info!("No migrations found");
            return Ok(RunReport::default());
        }

        let executed = self.ledger.list_executed().await?;
        let plan = MigrationPlan::new(definitions, executed);
        if plan.is_up_to_date() {
            tracing::info!(total = plan.total(), "All migrations are up to date");
            return Ok(RunReport::default());
        }

        let pending = plan.pending();
        tracing::info!(pending = pending.len(), "Found pending migration(s)");

        let mut applied = Vec::with_capacity(pending.len());
        for definition in pending {
            if let Err(e) = self.apply_one(definition).await {
                tracing::error!(
                    migration = %definition.key,
                    name = %definition.display_name,
                    applied = applied.len(),
                    not_attempted = pending.len() - applied.len() - 1,
                    error = %e,
                    "Migration run aborted"
                );
                return Err(e);
            }
            applied.push(definition.key.clone());
        }

        tracing::info!(
            applied = applied.len(),
            "All migrations completed successfully"
        );

        Ok(RunReport { applied })
    }

    /// Apply one migration and record it in the same transaction
    async fn apply_one(&self, definition: &MigrationDefinition) -> MigrateResult<()> {
        tracing::info!(
            migration = %definition.key,
            name = %definition.display_name,
            "Executing migration"
        );

        let mut tx = self
            .ledger
            .begin()
            .await
            .map_err(|e| with_context(definition, e))?;

        let outcome = match definition.apply(&mut tx).await {
            Ok(()) => {
                self.ledger
                    .record(&mut tx, &definition.key, &definition.display_name)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            if let Err(rollback_err) = self.ledger.rollback(tx).await {
                tracing::warn!(
                    migration = %definition.key,
                    error = %rollback_err,
                    "Rollback failed, the transaction is discarded with its connection"
                );
            }
            return Err(with_context(definition, e));
        }

        self.ledger
            .commit(tx)
            .await
            .map_err(|e| with_context(definition, e))?;

        tracing::info!(migration = %definition.key, "Migration completed successfully");
        Ok(())
    }
}

/// Attach the failing migration to an error
///
/// Ledger conflicts already name their migration and stay distinguishable.
fn with_context(definition: &MigrationDefinition, err: MigrateError) -> MigrateError {
    match err {
        conflict @ MigrateError::LedgerConflict { .. } => conflict,
        other => MigrateError::Apply {
            key: definition.key.clone(),
            name: definition.display_name.clone(),
            source: Box::new(other),
        },
    }
}
