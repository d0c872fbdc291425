//! Migration Loader
//!
//! Turns namespace sources into one validated, ordered list of definitions.
//!
//! ## Rules
//! - Identifiers not matching `<digits>_<description>` are skipped with a warning
//! - Candidates that fail to instantiate are logged and skipped
//! - A migration whose `id()` differs from its identifier number is skipped with a warning
//! - Duplicate `(namespace, sequence number)` pairs abort the load
//! - Each namespace is sorted by sequence number; namespaces keep their configured order

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use crate::domain::entity::definition::MigrationDefinition;
use crate::domain::migration::Migration;
use crate::domain::value_object::{
    migration_identifier::MigrationIdentifier, migration_key::MigrationKey, namespace::Namespace,
};
use crate::error::{MigrateError, MigrateResult};

/// One discovered, not yet validated migration
pub struct MigrationCandidate {
    /// `<digits>_<description>` identifier (file stem or registered name)
    pub identifier: String,
    /// Instantiated migration, or why instantiation failed
    pub instance: MigrateResult<Arc<dyn Migration>>,
}

/// Where a namespace's migrations come from
pub trait MigrationSource: Send + Sync {
    fn namespace(&self) -> &Namespace;

    /// Used in log output
    fn location(&self) -> String;

    /// Every migration the source can see, in any order
    fn candidates(&self) -> Vec<MigrationCandidate>;
}

type MigrationFactory = Box<dyn Fn() -> MigrateResult<Arc<dyn Migration>> + Send + Sync>;

/// Statically registered migrations of one namespace
pub struct MigrationRegistry {
    namespace: Namespace,
    entries: Vec<(String, MigrationFactory)>,
}

impl MigrationRegistry {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            entries: Vec::new(),
        }
    }

    /// Register a migration type under an identifier
    pub fn register<M>(self, identifier: impl Into<String>) -> Self
    where
        M: Migration + Default + 'static,
    {
        self.register_with(identifier, || {
            let migration: Arc<dyn Migration> = Arc::new(M::default());
            Ok(migration)
        })
    }

    /// Register a migration built by a fallible factory
    pub fn register_with<F>(mut self, identifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> MigrateResult<Arc<dyn Migration>> + Send + Sync + 'static,
    {
        self.entries.push((identifier.into(), Box::new(factory)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MigrationSource for MigrationRegistry {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn location(&self) -> String {
        format!("registry ({} entries)", self.entries.len())
    }

    fn candidates(&self) -> Vec<MigrationCandidate> {
        self.entries
            .iter()
            .map(|(identifier, factory)| MigrationCandidate {
                identifier: identifier.clone(),
                instance: factory(),
            })
            .collect()
    }
}

/// Ordered set of namespace sources
///
/// Source order is namespace priority: every definition of an earlier
/// source runs before any definition of a later one.
#[derive(Clone, Default)]
pub struct MigrationCatalog {
    sources: Vec<Arc<dyn MigrationSource>>,
}

impl MigrationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with the lowest priority so far
    pub fn with_source(mut self, source: impl MigrationSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Load every source, in priority order
    pub fn load(&self) -> MigrateResult<Vec<MigrationDefinition>> {
        let mut definitions = Vec::new();
        let mut seen: HashMap<MigrationKey, String> = HashMap::new();

        for source in &self.sources {
            tracing::debug!(
                namespace = %source.namespace(),
                location = %source.location(),
                "Loading migrations"
            );

            let loaded = load_namespace(source.as_ref());
            tracing::info!(
                namespace = %source.namespace(),
                count = loaded.len(),
                "Found migration(s)"
            );

            for definition in loaded {
                match seen.entry(definition.key.clone()) {
                    Entry::Occupied(existing) => {
                        return Err(MigrateError::DuplicateDefinition {
                            key: definition.key,
                            first: existing.get().clone(),
                            second: definition.display_name,
                        });
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(definition.display_name.clone());
                    }
                }
                definitions.push(definition);
            }
        }

        Ok(definitions)
    }
}

impl fmt::Debug for MigrationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.namespace()))
            .finish()
    }
}

/// Validate one source's candidates and sort them by sequence number
///
/// Never fails: a bad candidate only loses itself.
fn load_namespace(source: &dyn MigrationSource) -> Vec<MigrationDefinition> {
    let namespace = source.namespace();
    let mut definitions = Vec::new();

    for candidate in source.candidates() {
        let identifier = match MigrationIdentifier::parse(&candidate.identifier) {
            Ok(identifier) => identifier,
            Err(e) => {
                tracing::warn!(
                    namespace = %namespace,
                    identifier = %candidate.identifier,
                    error = %e,
                    "Skipping invalid migration identifier"
                );
                continue;
            }
        };

        let migration = match candidate.instance {
            Ok(migration) => migration,
            Err(e) => {
                tracing::error!(
                    namespace = %namespace,
                    identifier = %candidate.identifier,
                    error = %e,
                    "Failed to load migration"
                );
                continue;
            }
        };

        let expected = identifier.sequence();
        if migration.id() != u64::from(expected.get()) {
            tracing::warn!(
                namespace = %namespace,
                identifier = %candidate.identifier,
                expected = expected.get(),
                found = migration.id(),
                "Skipping migration with mismatched id"
            );
            continue;
        }

        let key = MigrationKey::new(namespace.clone(), expected);
        definitions.push(MigrationDefinition::new(key, migration));
    }

    // Stable, so duplicates keep discovery order for the error message
    definitions.sort_by_key(|d| d.key.sequence);
    definitions
}
