//! Migrator Entry Point
//!
//! Applies pending schema migrations (`run`) or reports them (`status`).
//! Base migrations are compiled in; project migrations are read from
//! `MIGRATIONS_DIR` as `.sql` files.

use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use migration::{
    MigrateError, MigrationCatalog, MigrationConfig, MigrationStatus, MigrationStatusUseCase,
    Namespace, PgMigrationStore, RunMigrationsUseCase, SqlDirectorySource, base_registry,
};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Forward-only schema migrations", long_about = None)]
struct Args {
    /// PostgreSQL connection URL (required unless the run is skipped)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Directory holding project migrations (`NNN_description.sql`)
    #[arg(long, env = "MIGRATIONS_DIR", default_value = "migrations")]
    migrations_dir: PathBuf,

    /// Ledger table name
    #[arg(long, env = "MIGRATIONS_TABLE", default_value = "migrations")]
    migrations_table: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending migration
    Run {
        /// Do nothing (for deployments that migrate elsewhere). Only `true` skips;
        /// any other value runs the migrations.
        #[arg(
            long,
            env = "SKIP_MIGRATIONS",
            action = clap::ArgAction::Set,
            value_parser = parse_skip,
            num_args = 0..=1,
            default_value = "false",
            default_missing_value = "true"
        )]
        skip: bool,
    },
    /// Show executed and pending migrations without applying anything
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "migrator=info,migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Commands::Run { skip: true } = args.command {
        tracing::info!("Skipping migrations (SKIP_MIGRATIONS=true)");
        return Ok(());
    }

    let database_url = args
        .database_url
        .as_deref()
        .context("DATABASE_URL is required")?;
    let pool = connect(database_url).await?;
    tracing::info!("Connected to database");

    let result = dispatch(&args, pool.clone()).await;
    pool.close().await;

    let status = result.map_err(|e| {
        e.log();
        anyhow::Error::new(e)
    })?;

    if let (Some(status), Commands::Status { json }) = (status, &args.command) {
        println!("{}", render_status(&status, *json)?);
    }

    Ok(())
}

/// Run the selected command; `status` hands its result back for printing
async fn dispatch(args: &Args, pool: PgPool) -> Result<Option<MigrationStatus>, MigrateError> {
    let config = MigrationConfig::default().with_ledger_table(args.migrations_table.as_str());
    let store = Arc::new(PgMigrationStore::new(pool, config)?);
    let catalog = Arc::new(
        MigrationCatalog::new()
            .with_source(base_registry())
            .with_source(SqlDirectorySource::new(
                Namespace::PROJECT,
                args.migrations_dir.clone(),
            )),
    );

    match args.command {
        Commands::Run { .. } => {
            let report = RunMigrationsUseCase::new(store, catalog).execute().await?;
            tracing::info!(applied = report.applied.len(), "Migrations completed");
            Ok(None)
        }
        Commands::Status { .. } => {
            let status = MigrationStatusUseCase::new(store, catalog).execute().await?;
            Ok(Some(status))
        }
    }
}

fn render_status(status: &MigrationStatus, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(status)?);
    }

    let mut lines = vec![
        format!("total:    {}", status.total),
        format!("executed: {}", status.executed.len()),
    ];
    lines.extend(status.executed.iter().map(|key| format!("  [x] {key}")));
    lines.push(format!("pending:  {}", status.pending.len()));
    lines.extend(status.pending.iter().map(|key| format!("  [ ] {key}")));
    Ok(lines.join("\n"))
}

/// `SKIP_MIGRATIONS` skips only on the exact value `true`
fn parse_skip(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

/// TLS for a connection, `None` when the URL already sets `sslmode`
fn ssl_mode_for(database_url: &str, host: &str) -> Option<PgSslMode> {
    if database_url.contains("sslmode=") {
        return None;
    }
    match host {
        "localhost" | "127.0.0.1" => Some(PgSslMode::Disable),
        _ => Some(PgSslMode::Require),
    }
}

/// Single-connection pool; TLS off for local databases unless the URL says otherwise
async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let mut options =
        PgConnectOptions::from_str(database_url).context("DATABASE_URL is not a valid URL")?;
    if let Some(mode) = ssl_mode_for(database_url, options.get_host()) {
        options = options.ssl_mode(mode);
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(20))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}
