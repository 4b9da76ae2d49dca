//! multisql - execute one SQL script against every server in a named group.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod logging;
pub mod orchestrator;
pub mod report;
pub mod statement;
