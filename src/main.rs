//! multisql - execute one SQL script against every server in a named group.

use multisql::cli::Cli;
use multisql::db::PostgresConnector;
use multisql::error::Result;
use multisql::logging;
use multisql::orchestrator::{App, RunOptions};
use tracing::debug;

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    let cli = Cli::parse_args();
    let options = cli.to_run_options();

    if let Err(e) = run(&options).await {
        debug!("Fatal {}: {:?}", e.category(), e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run(options: &RunOptions) -> Result<()> {
    let connector = PostgresConnector::new();
    let mut stdout = std::io::stdout().lock();

    App::new(options, &connector).run(&mut stdout).await?;
    Ok(())
}
