//! 002 - pending email change columns on users

use async_trait::async_trait;

use crate::domain::migration::{Migration, MigrationTx};
use crate::error::MigrateResult;

#[derive(Debug, Default)]
pub struct AddEmailChangeFields;

#[async_trait]
impl Migration for AddEmailChangeFields {
    fn id(&self) -> u64 {
        2
    }

    fn name(&self) -> &str {
        "Add email change fields to users"
    }

    async fn up(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        let pending_email_exists = tx.column_exists("users", "pending_email").await?;
        let token_exists = tx.column_exists("users", "email_change_token").await?;

        if pending_email_exists && token_exists {
            tracing::info!("Email change fields already exist, skipping");
            return Ok(());
        }

        if !pending_email_exists {
            tx.execute("ALTER TABLE users ADD COLUMN pending_email TEXT")
                .await?;
            tracing::info!(column = "pending_email", "Column added to users");
        }

        if !token_exists {
            tx.execute("ALTER TABLE users ADD COLUMN email_change_token UUID")
                .await?;
            tracing::info!(column = "email_change_token", "Column added to users");
        }

        Ok(())
    }

    fn is_reversible(&self) -> bool {
        true
    }

    async fn down(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        tx.execute(
            "ALTER TABLE users DROP COLUMN IF EXISTS pending_email, DROP COLUMN IF EXISTS email_change_token",
        )
        .await
    }
}
