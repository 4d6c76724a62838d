use anyhow::{Context, Result};
use clap::Parser;

use heicly::Converter;
use heicly_server::config::{Cli, Command, ConvertArgs};
use heicly_server::telemetry;

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_logging(cli.verbose)?;

    match cli.command() {
        Command::Serve(config) => heicly_server::serve(config, shutdown_signal()).await,
        Command::Convert(args) => tokio::task::spawn_blocking(move || convert(args))
            .await
            .context("Conversion task panicked")?,
    }
}

fn convert(args: ConvertArgs) -> Result<()> {
    if !args.output_dir.exists() {
        std::fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;
    }

    let converter = Converter::new(args.quality)?;

    log::info!("Converting {} files", args.inputs.len());
    let converted = converter.convert_files(&args.inputs, &args.output_dir)?;
    log::info!("Done: converted {} of {} files", converted.len(), args.inputs.len());

    Ok(())
}
