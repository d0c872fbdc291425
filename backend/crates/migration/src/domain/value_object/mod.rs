//! Value Object Module

pub mod migration_identifier;
pub mod migration_key;
pub mod namespace;
pub mod sequence_number;
