//! Delegation to the external `psql` client.
//!
//! Instead of opening a session itself, multisql can hand the SQL file to
//! `psql` once per target. Whatever `psql` prints is relayed verbatim; there
//! is no rows/empty/error distinction in this mode.

use crate::config::ConnectionTarget;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default client binary.
pub const DEFAULT_PSQL_BIN: &str = "psql";

/// What running `psql` on one target produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PsqlOutcome {
    /// All of stdout, then all of stderr. The two streams are captured
    /// separately, so their lines are not interleaved as psql produced them.
    Output(String),
    /// The client could not be started at all.
    SpawnFailed(String),
}

/// Runs `<bin> <target> -f <file>` and captures its output.
pub async fn run_psql(bin: &Path, target: &ConnectionTarget, file: &Path) -> PsqlOutcome {
    debug!("Running {} on {}", bin.display(), target);

    let output = Command::new(bin)
        .arg(target.as_str())
        .arg("-f")
        .arg(file)
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(output) => {
            if !output.status.success() {
                warn!("{} exited with {} on {}", bin.display(), output.status, target);
            }

            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            PsqlOutcome::Output(text)
        }
        Err(e) => {
            warn!("Could not start {}: {}", bin.display(), e);
            PsqlOutcome::SpawnFailed(format!("Could not run {}: {e}", bin.display()))
        }
    }
}
