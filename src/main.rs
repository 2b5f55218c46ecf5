use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use visa_consult_client::{
    cli::{execute_stats, execute_validate, run_consultation, Cli, Command},
    config::{Config, LogFormat},
    trace::text::Palette,
    Consultation, EngineClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.engine.base_url,
        "Visa consult client starting"
    );

    let client = match EngineClient::new(&config.engine, config.request.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to initialize engine client");
            return Err(e.into());
        }
    };

    let palette = Palette::new(!cli.no_color && std::io::stdout().is_terminal());

    match cli.command() {
        Command::Consult => {
            let consultation =
                Consultation::new(Arc::new(client), config.consultation.goal_categories.clone());
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();

            if let Err(e) = run_consultation(&consultation, stdin, &mut stdout, &palette).await {
                error!(error = %e, "Consultation aborted");
                return Err(e.into());
            }
        }
        Command::Validate => {
            let result = execute_validate(&client, &palette).await;
            print!("{}", result.message);
            std::process::exit(result.exit_code);
        }
        Command::Stats { limit } => {
            let result = execute_stats(&client, limit, &palette).await;
            print!("{}", result.message);
            std::process::exit(result.exit_code);
        }
    }

    info!("Consultation ended");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
