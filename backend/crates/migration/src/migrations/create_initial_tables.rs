//! 001 - users and activity_logs tables

use async_trait::async_trait;

use crate::domain::migration::{Migration, MigrationTx};
use crate::error::MigrateResult;

const CREATE_USERS: &str = r#"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    created TIMESTAMPTZ DEFAULT NOW(),
    updated TIMESTAMPTZ DEFAULT NOW(),
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    verified BOOLEAN DEFAULT FALSE,
    superadmin BOOLEAN DEFAULT FALSE,
    display_name TEXT NOT NULL,
    avatar TEXT DEFAULT '',
    token_key UUID DEFAULT gen_random_uuid(),
    email_visibility BOOLEAN DEFAULT FALSE
)
"#;

const CREATE_ACTIVITY_LOGS: &str = r#"
CREATE TABLE activity_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    timestamp BIGINT NOT NULL,
    event_type TEXT NOT NULL,
    table_name TEXT,
    record_id TEXT,
    user_id UUID,
    user_agent TEXT,
    metadata JSONB DEFAULT '{}'::jsonb
)
"#;

const CREATE_ACTIVITY_LOG_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_activity_logs_timestamp ON activity_logs (timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_activity_logs_user_id ON activity_logs (user_id);
CREATE INDEX IF NOT EXISTS idx_activity_logs_event_type ON activity_logs (event_type);
"#;

#[derive(Debug, Default)]
pub struct CreateInitialTables;

#[async_trait]
impl Migration for CreateInitialTables {
    fn id(&self) -> u64 {
        1
    }

    fn name(&self) -> &str {
        "Create initial users and activity_logs tables"
    }

    async fn up(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        if tx.table_exists("users").await? {
            tracing::info!(table = "users", "Table already exists, skipping");
        } else {
            tx.execute(CREATE_USERS).await?;
            tracing::info!(table = "users", "Table created");
        }

        if tx.table_exists("activity_logs").await? {
            tracing::info!(table = "activity_logs", "Table already exists, skipping");
        } else {
            tx.execute(CREATE_ACTIVITY_LOGS).await?;
            tracing::info!(table = "activity_logs", "Table created");
        }

        tx.execute(CREATE_ACTIVITY_LOG_INDEXES).await
    }

    fn is_reversible(&self) -> bool {
        true
    }

    async fn down(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        tx.execute("DROP TABLE IF EXISTS activity_logs; DROP TABLE IF EXISTS users;")
            .await
    }
}
