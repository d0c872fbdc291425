//! Entity Module

pub mod definition;
pub mod ledger_entry;
