use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faultline::ProblemDispatcher;
use faultline_demo::{AppConfig, AppState, logging, router};

/// Faultline demo - loan service answering every error as problem+json
#[derive(Parser)]
#[command(name = "faultline-demo")]
#[command(about = "Faultline demo - loan service answering every error as problem+json")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // 1) defaults -> 2) YAML -> 3) env (FAULTLINE__*) -> 4) CLI
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    logging::init_logging(&config.logging)?;

    let dispatcher =
        ProblemDispatcher::from_config(&config.problems).context("invalid problems section")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config, dispatcher).await,
        Commands::Check => {
            config.server.socket_addr()?;
            println!("Configuration is valid");
            Ok(())
        }
    }
}

async fn run_server(config: &AppConfig, dispatcher: ProblemDispatcher) -> Result<()> {
    if faultline::install(dispatcher).is_err() {
        anyhow::bail!("problem dispatcher already installed");
    }

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "faultline demo listening");

    axum::serve(listener, router(AppState::default()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("faultline demo stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
