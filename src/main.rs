use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use sat_catalogs::{app, config, logging, services, AppState};

#[derive(Parser)]
#[command(name = "sat_catalogs")]
#[command(author, version, about = "Convert the SAT CFDI catalog workbook to JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the latest catalog workbook and convert every sheet
    Convert {
        /// Use this workbook instead of downloading one
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// Root directory for converted catalogs (overrides OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Serve the latest catalogs over HTTP and convert daily
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    let cli = Cli::parse();

    // Load configuration
    let mut config = config::Config::new()?;

    match cli.command {
        Commands::Convert { workbook, output_dir } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let summary = services::conversion::run_conversion(&config, workbook)
                .await
                .context("catalog conversion failed")?;

            for failure in &summary.failed {
                tracing::warn!("Sheet {} was not converted: {}", failure.sheet, failure.reason);
            }
            tracing::info!(
                "{} sheets converted, {} already up to date",
                summary.converted.len(),
                summary.skipped_existing.len()
            );
        }
        Commands::Serve => {
            let config = Arc::new(config);
            let state = Arc::new(AppState::new(config.clone()));

            let scheduler = services::scheduler::start_scheduler(config.clone());

            let addr = config.bind_addr;
            tracing::info!("listening on http://{}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app(state)).await?;

            scheduler.abort();
        }
    }

    Ok(())
}
