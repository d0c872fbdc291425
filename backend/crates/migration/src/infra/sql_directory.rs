//! SQL Directory Source
//!
//! Loads a namespace from `NNN_description.sql` files, so a consuming
//! project can ship migrations without compiling them in.
//!
//! ## File format
//! ```sql
//! CREATE TABLE notes (id UUID PRIMARY KEY);
//! -- migrate:down
//! DROP TABLE notes;
//! ```
//! Everything above `-- migrate:down` is the up script. Without the marker
//! the migration is not reversible.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::loader::{MigrationCandidate, MigrationSource};
use crate::domain::migration::{Migration, MigrationTx};
use crate::domain::value_object::{
    migration_identifier::MigrationIdentifier, namespace::Namespace,
};
use crate::error::{MigrateError, MigrateResult};

const DOWN_MARKER: &str = "-- migrate:down";
const UP_MARKER: &str = "-- migrate:up";

/// Directory of `.sql` migrations for one namespace
#[derive(Debug, Clone)]
pub struct SqlDirectorySource {
    namespace: Namespace,
    dir: PathBuf,
}

impl SqlDirectorySource {
    pub fn new(namespace: Namespace, dir: impl Into<PathBuf>) -> Self {
        Self {
            namespace,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `.sql` files in the directory, sorted by name
    ///
    /// A missing or unreadable directory is an empty namespace.
    fn sql_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    namespace = %self.namespace,
                    dir = %self.dir.display(),
                    "Migrations directory not found, skipping"
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    namespace = %self.namespace,
                    dir = %self.dir.display(),
                    error = %e,
                    "Migrations directory not readable, skipping"
                );
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "sql"))
            .collect();
        files.sort();
        files
    }
}

impl MigrationSource for SqlDirectorySource {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn candidates(&self) -> Vec<MigrationCandidate> {
        self.sql_files()
            .into_iter()
            .map(|path| {
                let identifier = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let instance = MigrationIdentifier::parse(&identifier)
                    .map_err(|e| MigrateError::Load(e.to_string()))
                    .and_then(|parsed| SqlMigration::from_file(&path, &parsed))
                    .map(|migration| Arc::new(migration) as Arc<dyn Migration>);
                MigrationCandidate {
                    identifier,
                    instance,
                }
            })
            .collect()
    }
}

/// Migration backed by SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    id: u64,
    name: String,
    up: String,
    down: Option<String>,
}

impl SqlMigration {
    /// Read and parse one migration file
    pub fn from_file(path: &Path, identifier: &MigrationIdentifier) -> MigrateResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MigrateError::Load(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(identifier, &content)
    }

    /// Split file content into up and optional down scripts
    pub fn parse(identifier: &MigrationIdentifier, content: &str) -> MigrateResult<Self> {
        let mut up = String::new();
        let mut down: Option<String> = None;

        for line in content.lines() {
            let marker = line.trim();
            if marker.eq_ignore_ascii_case(UP_MARKER) {
                continue;
            }
            if marker.eq_ignore_ascii_case(DOWN_MARKER) {
                down.get_or_insert_with(String::new);
                continue;
            }
            let target = down.as_mut().unwrap_or(&mut up);
            target.push_str(line);
            target.push('\n');
        }

        if up.trim().is_empty() {
            return Err(MigrateError::Load(format!(
                "migration {} has an empty up script",
                identifier.description()
            )));
        }

        Ok(Self {
            id: u64::from(identifier.sequence().get()),
            name: identifier.humanized(),
            up,
            down: down.filter(|script| !script.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Migration for SqlMigration {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        tx.execute(&self.up).await
    }

    fn is_reversible(&self) -> bool {
        self.down.is_some()
    }

    async fn down(&self, tx: &mut dyn MigrationTx) -> MigrateResult<()> {
        match &self.down {
            Some(script) => tx.execute(script).await,
            None => Err(MigrateError::Statement(format!(
                "Down migration not implemented for migration {}",
                self.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(s: &str) -> MigrationIdentifier {
        MigrationIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_parse_up_only() {
        let migration = SqlMigration::parse(
            &identifier("004_create_notes"),
            "CREATE TABLE notes (id UUID PRIMARY KEY);\n",
        )
        .unwrap();

        assert_eq!(migration.id(), 4);
        assert_eq!(migration.name(), "create notes");
        assert!(!migration.is_reversible());
        assert!(migration.up.contains("CREATE TABLE notes"));
    }

    #[test]
    fn test_parse_up_and_down() {
        let content = "-- migrate:up\nCREATE TABLE notes (id UUID);\n-- migrate:down\nDROP TABLE notes;\n";
        let migration = SqlMigration::parse(&identifier("5_notes"), content).unwrap();

        assert!(migration.is_reversible());
        assert_eq!(migration.up.trim(), "CREATE TABLE notes (id UUID);");
        assert_eq!(migration.down.as_deref().map(str::trim), Some("DROP TABLE notes;"));
    }

    #[test]
    fn test_blank_down_is_not_reversible() {
        let content = "CREATE TABLE notes (id UUID);\n-- migrate:down\n\n";
        let migration = SqlMigration::parse(&identifier("5_notes"), content).unwrap();
        assert!(!migration.is_reversible());
    }

    #[test]
    fn test_empty_up_is_rejected() {
        let result = SqlMigration::parse(&identifier("6_nothing"), "-- migrate:down\nDROP TABLE x;");
        assert!(matches!(result, Err(MigrateError::Load(_))));
    }

    #[test]
    fn test_unreadable_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqlMigration::from_file(
            &dir.path().join("007_gone.sql"),
            &identifier("007_gone"),
        );

        match result {
            Err(MigrateError::Load(message)) => assert!(message.contains("cannot read")),
            other => panic!("expected Load error, got {other:?}"),
        }
    }
}
