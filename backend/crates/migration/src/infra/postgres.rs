//! PostgreSQL Ledger and Transaction Implementations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, PgConnection, PgPool, Postgres, Transaction};

use crate::application::config::MigrationConfig;
use crate::domain::entity::ledger_entry::LedgerEntry;
use crate::domain::migration::MigrationTx;
use crate::domain::repository::{Database, MigrationLedger};
use crate::domain::value_object::{
    migration_key::MigrationKey, namespace::Namespace, sequence_number::SequenceNumber,
};
use crate::error::{MigrateError, MigrateResult};

/// PostgreSQL-backed migrations ledger
///
/// The pool is owned by the caller; this type only scopes transactions.
#[derive(Clone)]
pub struct PgMigrationStore {
    pool: PgPool,
    config: MigrationConfig,
}

impl PgMigrationStore {
    pub fn new(pool: PgPool, config: MigrationConfig) -> MigrateResult<Self> {
        config.validate()?;
        Ok(Self { pool, config })
    }

    /// `schema.table`, both validated as plain identifiers
    fn ledger_table(&self) -> String {
        format!("{}.{}", self.config.schema, self.config.ledger_table)
    }
}

// ============================================================================
// Transaction handle
// ============================================================================

/// Transaction handed to migrations
pub struct PgMigrationTx {
    tx: Transaction<'static, Postgres>,
    schema: String,
}

#[async_trait]
impl MigrationTx for PgMigrationTx {
    async fn execute(&mut self, sql: &str) -> MigrateResult<()> {
        // Simple query protocol, so one call may carry several statements
        let conn: &mut PgConnection = &mut self.tx;
        Executor::execute(conn, sqlx::raw_sql(sql)).await?;
        Ok(())
    }

    async fn table_exists(&mut self, table: &str) -> MigrateResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1
                AND table_name = $2
            )
            "#,
        )
        .bind(self.schema.as_str())
        .bind(table)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(exists)
    }

    async fn column_exists(&mut self, table: &str, column: &str) -> MigrateResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = $1
                AND table_name = $2
                AND column_name = $3
            )
            "#,
        )
        .bind(self.schema.as_str())
        .bind(table)
        .bind(column)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Database Implementation
// ============================================================================

impl Database for PgMigrationStore {
    type Tx = PgMigrationTx;

    async fn begin(&self) -> MigrateResult<PgMigrationTx> {
        let tx = self.pool.begin().await?;
        Ok(PgMigrationTx {
            tx,
            schema: self.config.schema.clone(),
        })
    }

    async fn commit(&self, tx: PgMigrationTx) -> MigrateResult<()> {
        tx.tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: PgMigrationTx) -> MigrateResult<()> {
        tx.tx.rollback().await?;
        Ok(())
    }
}

// ============================================================================
// Migration Ledger Implementation
// ============================================================================

impl MigrationLedger for PgMigrationStore {
    async fn ensure_table(&self) -> MigrateResult<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                row_id SERIAL PRIMARY KEY,
                sequence_number INTEGER NOT NULL,
                namespace TEXT NOT NULL,
                display_name TEXT NOT NULL,
                executed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (namespace, sequence_number)
            )
            "#,
            self.ledger_table()
        );

        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => Ok(()),
            // Two runners racing on IF NOT EXISTS collide on the catalog's type name
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::debug!("Ledger table created concurrently by another runner");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_executed(&self) -> MigrateResult<Vec<LedgerEntry>> {
        let sql = format!(
            r#"
            SELECT
                namespace,
                sequence_number,
                display_name,
                executed_at
            FROM {}
            ORDER BY row_id
            "#,
            self.ledger_table()
        );

        let rows = sqlx::query_as::<_, LedgerRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(LedgerRow::into_entry).collect())
    }

    async fn record(
        &self,
        tx: &mut PgMigrationTx,
        key: &MigrationKey,
        display_name: &str,
    ) -> MigrateResult<()> {
        let sql = format!(
            "INSERT INTO {} (sequence_number, namespace, display_name) VALUES ($1, $2, $3)",
            self.ledger_table()
        );

        let result = sqlx::query(&sql)
            .bind(key.sequence.as_i32())
            .bind(key.namespace.as_str())
            .bind(display_name)
            .execute(&mut *tx.tx)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(MigrateError::LedgerConflict {
                    key: key.clone(),
                    name: display_name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct LedgerRow {
    namespace: String,
    sequence_number: i32,
    display_name: String,
    executed_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_entry(self) -> LedgerEntry {
        LedgerEntry {
            key: MigrationKey::new(
                Namespace::from_db(self.namespace),
                SequenceNumber::from_db(self.sequence_number),
            ),
            display_name: self.display_name,
            executed_at: self.executed_at,
        }
    }
}
