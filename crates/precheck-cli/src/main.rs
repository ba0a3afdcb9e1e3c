//! Precheck CLI - Extract test and resolution triplets from support artifacts.

use clap::Parser;
use precheck_cli::{build_extractor, run_extract, AppConfig, Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays machine readable
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

async fn run(cli: Cli) -> precheck_cli::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Extract(args) => {
            // Capabilities are built once and dropped on exit
            let extractor = build_extractor(&config)?;
            let json = run_extract(&args, &extractor).await?;
            println!("{}", json);
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
