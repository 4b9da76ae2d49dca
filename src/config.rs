//! Server group configuration for multisql.
//!
//! The configuration document is a JSON object mapping group names to ordered
//! lists of connection strings:
//!
//! ```json
//! { "production": ["postgres://app@db1/app", "postgres://app@db2/app"] }
//! ```

use crate::error::{MultisqlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// File name of the configuration document.
pub const CONFIG_FILE_NAME: &str = ".multisqlrc";

/// One addressable database server, identified by its connection string.
///
/// The string is opaque to multisql and handed verbatim to the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionTarget(String);

impl ConnectionTarget {
    pub fn new(conn_str: impl Into<String>) -> Self {
        Self(conn_str.into())
    }

    /// Returns the connection string exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a display-safe string with any URL password masked.
    ///
    /// Strings that are not URLs (e.g. libpq key/value form) are returned as-is.
    pub fn redacted(&self) -> String {
        match Url::parse(&self.0) {
            Ok(mut url) if url.password().is_some() => {
                if url.set_password(Some("***")).is_err() {
                    return self.0.clone();
                }
                url.to_string()
            }
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl From<&str> for ConnectionTarget {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

/// Mapping from group name to its ordered connection targets.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerGroups {
    groups: HashMap<String, Vec<ConnectionTarget>>,
}

impl ServerGroups {
    /// Returns the default config file path.
    ///
    /// `.multisqlrc` in the working directory wins; otherwise `~/.multisqlrc`
    /// is used when it exists. When neither exists the working-directory path
    /// is returned so the "not found" diagnostic names it.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }

        match dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME)) {
            Some(home) if home.exists() => home,
            _ => local,
        }
    }

    /// Loads server groups from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MultisqlError::ConfigFileMissing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| MultisqlError::ConfigInvalid(path.to_path_buf(), e.to_string()))?;

        Self::parse_json(&content, path)
    }

    /// Parses server groups from a JSON string.
    fn parse_json(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| MultisqlError::ConfigInvalid(path.to_path_buf(), e.to_string()))
    }

    /// Returns the ordered targets of the named group.
    pub fn resolve(&self, name: &str) -> Result<&[ConnectionTarget]> {
        self.groups
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| MultisqlError::GroupNotFound(name.to_string()))
    }

    /// Returns the configured group names, sorted.
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<(String, Vec<ConnectionTarget>)> for ServerGroups {
    fn from_iter<I: IntoIterator<Item = (String, Vec<ConnectionTarget>)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
