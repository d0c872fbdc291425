//! Application Configuration
//!
//! Configuration for the migration runner.

use crate::error::{MigrateError, MigrateResult};

/// Postgres truncates identifiers longer than this
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Migration runner configuration
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Ledger table name
    pub ledger_table: String,
    /// Schema searched by `table_exists` / `column_exists`
    pub schema: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            ledger_table: "migrations".to_string(),
            schema: "public".to_string(),
        }
    }
}

impl MigrationConfig {
    /// Use a different ledger table
    pub fn with_ledger_table(mut self, table: impl Into<String>) -> Self {
        self.ledger_table = table.into();
        self
    }

    /// Use a different schema
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Both names end up interpolated into DDL, so they must be plain identifiers
    pub fn validate(&self) -> MigrateResult<()> {
        validate_identifier("ledger table", &self.ledger_table)?;
        validate_identifier("schema", &self.schema)?;
        Ok(())
    }
}

fn validate_identifier(what: &str, value: &str) -> MigrateResult<()> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::InvalidConfig(format!(
            "{what} '{value}' is not a valid SQL identifier"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MigrationConfig::default();
        assert_eq!(config.ledger_table, "migrations");
        assert_eq!(config.schema, "public");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_injection() {
        let config = MigrationConfig::default().with_ledger_table("migrations; DROP TABLE users");
        assert!(matches!(
            config.validate(),
            Err(MigrateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_schema() {
        assert!(MigrationConfig::default().with_schema("").validate().is_err());
        assert!(MigrationConfig::default().with_schema("1abc").validate().is_err());
        assert!(
            MigrationConfig::default()
                .with_schema("x".repeat(64))
                .validate()
                .is_err()
        );
        assert!(
            MigrationConfig::default()
                .with_schema("app_schema")
                .validate()
                .is_ok()
        );
    }
}
