use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use docconnect::connector::api::{Container, ContainerConfig, Router};
use docconnect::Commands;

#[derive(Parser)]
#[command(name = "docconnect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Service configuration file (TOML)
    #[arg(short, long, global = true, env = "DOCCONNECT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        config_path: cli.config,
        catalog: None,
    });
    let router = Router::new(&container);

    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_connection_accepts_repeated_settings() {
        let cli = Cli::try_parse_from([
            "docconnect",
            "test-connection",
            "embedding",
            "openai",
            "--set",
            "api_key=sk-test",
            "--set",
            "batch_size=8",
        ])
        .unwrap();

        match cli.command {
            Commands::TestConnection { settings, .. } => assert_eq!(settings.len(), 2),
            _ => panic!("expected test-connection"),
        }
    }

    #[test]
    fn embed_requires_text() {
        assert!(Cli::try_parse_from(["docconnect", "embed"]).is_err());
    }
}
