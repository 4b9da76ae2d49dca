//! Run orchestration.
//!
//! Loads the configuration and the SQL file, resolves the group, then visits
//! every target of the group in order. Only the loading steps can fail the
//! run; a target that fails is reported and the loop moves on.

use crate::config::{ConnectionTarget, ServerGroups};
use crate::db::Connector;
use crate::error::{MultisqlError, Result};
use crate::executor::{execute_target, run_psql, PsqlOutcome};
use crate::report::{ColorMode, Reporter};
use crate::statement::StatementBatch;
use futures::stream::{self, StreamExt};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// How the batch reaches each server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Open a session and run the batch directly.
    Driver,
    /// Run `<bin> <target> -f <file>` and relay its output.
    Psql { bin: PathBuf },
}

/// Everything a run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub sql_path: PathBuf,
    pub group: String,
    pub mode: ExecutionMode,
    /// Targets in flight at once; 1 runs them strictly one after another.
    pub jobs: usize,
    pub color: ColorMode,
}

/// Per-run counters. Never affects the exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub targets: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, failed: bool) {
        self.targets += 1;
        if failed {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
    }
}

/// Drives one run over a server group.
pub struct App<'a> {
    options: &'a RunOptions,
    connector: &'a dyn Connector,
    color: ColorMode,
}

impl<'a> App<'a> {
    pub fn new(options: &'a RunOptions, connector: &'a dyn Connector) -> Self {
        // Decide colour support once for every reporter of this run.
        let color = if options.color.enabled() {
            ColorMode::Always
        } else {
            ColorMode::Never
        };

        Self {
            options,
            connector,
            color,
        }
    }

    /// Runs the batch on every target of the group, reporting into `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        info!("Loading config from: {}", self.options.config_path.display());
        let groups = ServerGroups::load_from_file(&self.options.config_path)?;

        let batch = StatementBatch::load(&self.options.sql_path)?;
        let targets = groups.resolve(&self.options.group).inspect_err(|_| {
            debug!("Known groups: {:?}", groups.group_names());
        })?;
        info!(
            "Running {} on {} server(s) of group {}",
            batch.path().display(),
            targets.len(),
            self.options.group
        );

        let summary = if self.options.jobs <= 1 {
            self.run_sequential(targets, &batch, out).await?
        } else {
            self.run_parallel(targets, &batch, out).await?
        };

        info!(
            "Done: {} server(s), {} ok, {} failed",
            summary.targets, summary.succeeded, summary.failed
        );
        Ok(summary)
    }

    async fn run_sequential<W: Write>(
        &self,
        targets: &[ConnectionTarget],
        batch: &StatementBatch,
        out: &mut W,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut reporter = Reporter::new(out, self.color);

        for target in targets {
            let failed = self
                .visit(target, batch, &mut reporter)
                .await
                .map_err(write_error)?;
            summary.record(failed);
        }

        Ok(summary)
    }

    /// Runs up to `jobs` targets at once. Each target's report is buffered
    /// and written whole, in group order.
    async fn run_parallel<W: Write>(
        &self,
        targets: &[ConnectionTarget],
        batch: &StatementBatch,
        out: &mut W,
    ) -> Result<RunSummary> {
        debug!("Running with {} jobs", self.options.jobs);
        let mut summary = RunSummary::default();

        let mut reports = stream::iter(targets)
            .map(|target| async move {
                let mut reporter = Reporter::new(Vec::new(), self.color);
                let failed = self.visit(target, batch, &mut reporter).await;
                (reporter.into_inner(), failed)
            })
            .buffered(self.options.jobs);

        while let Some((buffer, failed)) = reports.next().await {
            let failed = failed.map_err(write_error)?;
            out.write_all(&buffer).map_err(write_error)?;
            out.flush().map_err(write_error)?;
            summary.record(failed);
        }

        Ok(summary)
    }

    /// Banner, execution and report for one target. Returns whether it failed.
    async fn visit<W: Write>(
        &self,
        target: &ConnectionTarget,
        batch: &StatementBatch,
        reporter: &mut Reporter<W>,
    ) -> io::Result<bool> {
        reporter.banner(target)?;
        reporter.flush()?;

        let failed = match &self.options.mode {
            ExecutionMode::Driver => {
                let outcome = execute_target(self.connector, target, batch).await;
                reporter.outcome(&outcome)?;
                outcome.is_error()
            }
            ExecutionMode::Psql { bin } => {
                let outcome = run_psql(bin, target, batch.path()).await;
                reporter.psql(&outcome)?;
                matches!(outcome, PsqlOutcome::SpawnFailed(_))
            }
        };

        reporter.flush()?;
        Ok(failed)
    }
}

fn write_error(e: io::Error) -> MultisqlError {
    MultisqlError::internal(format!("Failed to write report: {e}"))
}
