//! Migration Key Value Object
//!
//! `(namespace, sequence number)` identity shared by definitions and
//! ledger entries. Rendered as `namespace:number`, e.g. `base:1`.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::domain::value_object::{namespace::Namespace, sequence_number::SequenceNumber};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationKey {
    pub namespace: Namespace,
    pub sequence: SequenceNumber,
}

impl MigrationKey {
    pub fn new(namespace: Namespace, sequence: SequenceNumber) -> Self {
        Self {
            namespace,
            sequence,
        }
    }
}

impl fmt::Display for MigrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.sequence)
    }
}

impl Serialize for MigrationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
