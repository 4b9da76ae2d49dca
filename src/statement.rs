//! Loading of the SQL script to run.

use crate::error::{MultisqlError, Result};
use std::path::{Path, PathBuf};

/// The full text of the SQL script, treated as one opaque batch.
#[derive(Debug, Clone)]
pub struct StatementBatch {
    path: PathBuf,
    sql: String,
}

impl StatementBatch {
    /// Reads the whole file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MultisqlError::SqlFileMissing(path.to_path_buf()));
        }

        let sql = std::fs::read_to_string(path)
            .map_err(|e| MultisqlError::SqlFileUnreadable(path.to_path_buf(), e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            sql,
        })
    }

    /// Creates a batch from in-memory text. `path` is only used by psql mode.
    pub fn from_sql(path: impl Into<PathBuf>, sql: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sql: sql.into(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Path the batch was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
