//! Mock session layer for testing.
//!
//! Scripts the behaviour of each target and keeps track of opened and closed
//! sessions so tests can check that nothing leaks.

use super::{BatchResult, Connector, Row, Session, SessionError};
use crate::config::ConnectionTarget;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a mocked target does when the batch is run against it.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Returns the given rows.
    Rows(Vec<Row>),
    /// Runs successfully and returns nothing.
    Empty,
    /// Modifies the given number of rows without returning any.
    Affected(u64),
    /// Rejects the batch with a statement-level error.
    DriverError(String),
    /// Cannot be connected to.
    Unreachable(String),
    /// Connects, then loses the connection mid-batch.
    Disconnects(String),
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

/// A connector whose targets behave as scripted.
///
/// Targets without a script answer with [`MockBehavior::Empty`].
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    behaviors: HashMap<String, MockBehavior>,
    delays: HashMap<String, Duration>,
    counters: Arc<Counters>,
}

impl MockConnector {
    /// Creates a mock where every target returns an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the behaviour of one target.
    pub fn with_target(mut self, target: impl Into<String>, behavior: MockBehavior) -> Self {
        self.behaviors.insert(target.into(), behavior);
        self
    }

    /// Makes batch execution on one target take `delay`.
    pub fn with_delay(mut self, target: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(target.into(), delay);
        self
    }

    /// Number of sessions successfully opened.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions closed.
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Targets that a connection was attempted to, in attempt order.
    pub fn visited(&self) -> Vec<String> {
        self.counters
            .visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn Session>, SessionError> {
        if let Ok(mut visited) = self.counters.visited.lock() {
            visited.push(target.as_str().to_string());
        }

        let behavior = self
            .behaviors
            .get(target.as_str())
            .cloned()
            .unwrap_or(MockBehavior::Empty);

        if let MockBehavior::Unreachable(msg) = behavior {
            return Err(SessionError::Transport(msg));
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            closed: false,
            behavior,
            delay: self.delays.get(target.as_str()).copied(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct MockSession {
    closed: bool,
    behavior: MockBehavior,
    delay: Option<Duration>,
    counters: Arc<Counters>,
}

#[async_trait]
impl Session for MockSession {
    async fn execute_batch(&mut self, _sql: &str) -> Result<BatchResult, SessionError> {
        if self.closed {
            return Err(SessionError::transport("Session is closed"));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Rows(rows) => Ok(BatchResult::with_rows(rows.clone())),
            MockBehavior::Empty => Ok(BatchResult::default()),
            MockBehavior::Affected(count) => {
                Ok(BatchResult::default().with_rows_affected(*count))
            }
            MockBehavior::DriverError(msg) => Err(SessionError::driver(msg.clone())),
            MockBehavior::Disconnects(msg) | MockBehavior::Unreachable(msg) => {
                Err(SessionError::transport(msg.clone()))
            }
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
