use arb_signal_engine::cli::{Cli, Commands};
use arb_signal_engine::config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; only an unreadable file falls back to defaults
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) if e.is::<std::io::Error>() => {
            eprintln!("Warning: Could not read config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::default()
        }
        Err(e) => return Err(e.context(format!("Invalid config {}", cli.config))),
    };

    // Initialize telemetry
    let _telemetry = arb_signal_engine::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting detection loop");
            args.execute(&config).await?;
        }
        Commands::Scan(args) => {
            args.execute(&config).await?;
        }
        Commands::Signals(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
