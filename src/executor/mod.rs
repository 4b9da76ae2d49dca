//! Per-target batch execution.
//!
//! Runs the statement batch against one target and turns whatever happens
//! into an [`ExecutionOutcome`]. Nothing in here returns an error: a broken
//! target is an outcome like any other.

pub mod psql;

pub use psql::{run_psql, PsqlOutcome};

use crate::config::ConnectionTarget;
use crate::db::{Connector, Row, SessionError};
use crate::statement::StatementBatch;
use tracing::{debug, warn};

/// The result of running the batch on one target.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The batch returned rows, in server order.
    Rows(Vec<Row>),
    /// The batch ran and returned no rows.
    Empty,
    /// The server rejected a statement.
    DriverError(String),
    /// The server could not be reached or the connection broke.
    TransportError(String),
}

impl ExecutionOutcome {
    /// Returns true for the two error variants.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::DriverError(_) | Self::TransportError(_))
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rows(_) => "rows",
            Self::Empty => "empty",
            Self::DriverError(_) => "driver error",
            Self::TransportError(_) => "transport error",
        }
    }
}

impl From<SessionError> for ExecutionOutcome {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Driver(msg) => Self::DriverError(msg),
            SessionError::Transport(msg) => Self::TransportError(msg),
        }
    }
}

/// Runs `batch` on `target` through a fresh session.
///
/// The session is closed before returning on every path where one was opened.
pub async fn execute_target(
    connector: &dyn Connector,
    target: &ConnectionTarget,
    batch: &StatementBatch,
) -> ExecutionOutcome {
    let mut session = match connector.open(target).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Could not open session on {}: {}", target, e);
            return e.into();
        }
    };

    let result = session.execute_batch(batch.sql()).await;
    session.close().await;
    debug!("Session on {} closed", target);

    let outcome = match result {
        Ok(result) if result.rows.is_empty() => {
            debug!("{} rows affected on {}", result.rows_affected, target);
            ExecutionOutcome::Empty
        }
        Ok(result) => ExecutionOutcome::Rows(result.rows),
        Err(e) => {
            warn!("Batch failed on {}: {}", target, e);
            e.into()
        }
    };

    debug!("Outcome on {}: {}", target, outcome.kind());
    outcome
}
