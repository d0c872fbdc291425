//! 003 - password_reset_requests table

use async_trait::async_trait;

use crate::domain::migration::{Migration, MigrationTx};
use crate::error::MigrateResult;

const CREATE_PASSWORD_RESET_REQUESTS: &str = r#"
CREATE TABLE password_reset_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    expires TIMESTAMP NOT NULL,
    user_id UUID NOT NULL,
    token TEXT NOT NULL UNIQUE,
    used BOOLEAN DEFAULT FALSE NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
);
CREATE UNIQUE INDEX password_reset_requests_token_idx ON password_reset_requests (token);
CREATE INDEX password_reset_requests_user_id_idx ON password_reset_requests (user_id);
CREATE INDEX password_reset_requests_expires_idx ON password_reset_requests (expires);
CREATE INDEX password_reset_requests_used_idx ON password_reset_requests (used);
"#;

#[derive(Debug, Default)]
pub struct CreatePasswordResetTable;

#[async_trait]
impl Migration for CreatePasswordResetTable {
    fn id(&self) -> u64 {
        3
    }

    fn name(&self) -> &str {
        "Create password reset requests table"
    }

    async fn up(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        if tx.table_exists("password_reset_requests").await? {
            tracing::info!(
                table = "password_reset_requests",
                "Table already exists, skipping"
            );
            return Ok(());
        }

        tx.execute(CREATE_PASSWORD_RESET_REQUESTS).await?;
        tracing::info!(table = "password_reset_requests", "Table created");
        Ok(())
    }

    fn is_reversible(&self) -> bool {
        true
    }

    async fn down(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        tx.execute("DROP TABLE IF EXISTS password_reset_requests")
            .await
    }
}
