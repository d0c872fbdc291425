//! PostgreSQL integration tests
//!
//! Run only when `DATABASE_URL` points at a disposable database. Each test
//! works in its own schema (set as `search_path`) and drops it afterwards.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use migration::{
    MigrateError, MigrationCatalog, MigrationConfig, MigrationStatusUseCase, Namespace,
    PgMigrationStore, RunMigrationsUseCase, SqlDirectorySource, base_registry,
};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

struct TestDb {
    admin: PgPool,
    pool: PgPool,
    schema: String,
}

impl TestDb {
    async fn connect(label: &str) -> Option<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "migration=debug".into()),
            )
            .with_test_writer()
            .try_init();

        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping {label}");
            return None;
        };

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let schema = format!("migration_test_{label}_{}_{nanos}", std::process::id());

        let admin = PgPool::connect(&url).await.unwrap();
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .unwrap();

        let options = PgConnectOptions::from_str(&url)
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();

        Some(Self {
            admin,
            pool,
            schema,
        })
    }

    fn store(&self) -> Arc<PgMigrationStore> {
        let config = MigrationConfig::default().with_schema(self.schema.as_str());
        Arc::new(PgMigrationStore::new(self.pool.clone(), config).unwrap())
    }

    async fn ledger_rows(&self) -> Vec<(String, i32)> {
        sqlx::query_as(&format!(
            "SELECT namespace, sequence_number FROM {}.migrations ORDER BY row_id",
            self.schema
        ))
        .fetch_all(&self.admin)
        .await
        .unwrap()
    }

    async fn table_exists(&self, table: &str) -> bool {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = $1 AND table_name = $2)",
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_one(&self.admin)
        .await
        .unwrap()
    }

    async fn cleanup(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
        self.admin.close().await;
    }
}

fn catalog(dir: &Path) -> Arc<MigrationCatalog> {
    Arc::new(
        MigrationCatalog::new()
            .with_source(base_registry())
            .with_source(SqlDirectorySource::new(Namespace::PROJECT, dir)),
    )
}

#[tokio::test]
async fn test_base_and_project_migrations_apply_once() {
    let Some(db) = TestDb::connect("apply").await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("001_create_notes.sql"),
        "CREATE TABLE notes (id UUID PRIMARY KEY, user_id UUID REFERENCES users (id));\n",
    )
    .unwrap();
    let catalog = catalog(dir.path());

    let report = RunMigrationsUseCase::new(db.store(), Arc::clone(&catalog))
        .execute()
        .await
        .unwrap();
    let applied: Vec<String> = report.applied.iter().map(ToString::to_string).collect();
    assert_eq!(applied, vec!["base:1", "base:2", "base:3", "project:1"]);

    for table in ["users", "activity_logs", "password_reset_requests", "notes"] {
        assert!(db.table_exists(table).await, "{table} missing");
    }

    let second = RunMigrationsUseCase::new(db.store(), Arc::clone(&catalog))
        .execute()
        .await
        .unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(db.ledger_rows().await.len(), 4);

    let status = MigrationStatusUseCase::new(db.store(), catalog)
        .execute()
        .await
        .unwrap();
    assert!(status.pending.is_empty());
    assert_eq!(status.total, 4);

    db.cleanup().await;
}

#[tokio::test]
async fn test_failed_migration_rolls_back() {
    let Some(db) = TestDb::connect("rollback").await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("001_first.sql"), "CREATE TABLE first_table (id INT);").unwrap();
    std::fs::write(
        dir.path().join("002_broken.sql"),
        "CREATE TABLE broken_table (id INT);\nSELECT * FROM table_that_does_not_exist;\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("003_third.sql"), "CREATE TABLE third_table (id INT);").unwrap();

    let err = RunMigrationsUseCase::new(db.store(), catalog(dir.path()))
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(err, MigrateError::Apply { .. }));
    assert_eq!(err.key().map(ToString::to_string).as_deref(), Some("project:2"));
    assert!(db.table_exists("first_table").await);
    assert!(!db.table_exists("broken_table").await);
    assert!(!db.table_exists("third_table").await);

    let rows = db.ledger_rows().await;
    assert_eq!(rows.last(), Some(&("project".to_string(), 1)));
    assert!(!rows.contains(&("project".to_string(), 2)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_concurrent_runners_record_each_migration_once() {
    let Some(db) = TestDb::connect("race").await else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("001_noop.sql"), "SELECT pg_sleep(0.2);").unwrap();
    let catalog = Arc::new(
        MigrationCatalog::new()
            .with_source(SqlDirectorySource::new(Namespace::PROJECT, dir.path())),
    );

    // Create the ledger up front; this test is about the insert race
    MigrationStatusUseCase::new(db.store(), Arc::clone(&catalog))
        .execute()
        .await
        .unwrap();

    let first = RunMigrationsUseCase::new(db.store(), Arc::clone(&catalog));
    let second = RunMigrationsUseCase::new(db.store(), Arc::clone(&catalog));
    let (a, b) = tokio::join!(first.execute(), second.execute());

    for result in [&a, &b] {
        if let Err(e) = result {
            assert!(e.is_conflict(), "unexpected error: {e}");
        }
    }
    assert!(a.is_ok() || b.is_ok());
    assert_eq!(db.ledger_rows().await, vec![("project".to_string(), 1)]);

    db.cleanup().await;
}
