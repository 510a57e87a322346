//! `jobtrawl` binary.

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use jobtrawl_browser::ChromiumLauncher;
use jobtrawl_core::RunOutcome;
use jobtrawl_crawler::CrawlController;
use jobtrawl_export::FileExporter;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config(|key| std::env::var(key).ok())?;

    if let Some(path) = &cli.write_config {
        config.save(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let _guard = logging::init_tracing(&config.output.directory)?;
    tracing::info!("Starting jobtrawl v{}", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing up");
            interrupt.cancel();
        }
    });

    let exporter = FileExporter::from_settings(&config.output);
    tracing::info!("Writing output to {}", exporter.directory().display());
    let controller = CrawlController::new(config, ChromiumLauncher::new(), exporter, cancel)?;
    let report = controller.run().await;
    println!("{report}");

    match report.outcome {
        RunOutcome::Aborted { reason } => anyhow::bail!("crawl aborted: {reason}"),
        RunOutcome::Completed | RunOutcome::Cancelled => Ok(()),
    }
}
