//! Integration tests for multisql.

pub mod cli_test;
pub mod postgres_test;
