//! Session layer for multisql.
//!
//! Provides a trait-based interface for opening one session per target and
//! running a statement batch on it, so the executor can be driven by the real
//! PostgreSQL client or by the scripted mock in tests.

mod mock;
mod postgres;
mod types;

pub use mock::{MockBehavior, MockConnector};
pub use postgres::PostgresConnector;
pub use types::{BatchResult, Row, Value};

use crate::config::ConnectionTarget;
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the session layer for a single target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The server rejected a statement (syntax error, constraint violation, etc.)
    #[error("{0}")]
    Driver(String),

    /// The server could not be reached or the session broke (refused, auth, TLS, etc.)
    #[error("{0}")]
    Transport(String),
}

impl SessionError {
    /// Creates a driver error with the given message.
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Opens sessions against connection targets.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a fresh autocommit session. Any failure here is a transport error.
    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn Session>, SessionError>;
}

/// One open session on one server.
#[async_trait]
pub trait Session: Send {
    /// Sends the whole batch to the server and collects what it returns.
    async fn execute_batch(&mut self, sql: &str) -> Result<BatchResult, SessionError>;

    /// Closes the session. Calling it again does nothing.
    async fn close(&mut self);
}
