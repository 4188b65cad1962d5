use anyhow::Result;
use clap::Parser;
use ldq_cli::cli::{Cli, Commands};
use ldq_cli::commands;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries query output only
    let level = cli.level();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(format!(
            "ldq_cli={level},ldq_query={level},ldq_store={level},ldq_config={level}"
        )))
        .init();

    let config = commands::load_config(cli.config.as_deref()).await?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Compile(args) => {
            println!("{}", commands::compile(&args, config).await?);
        }
        Commands::Run { data, query } => {
            for iri in commands::run(&data, &query, config).await? {
                println!("{}", iri.as_str());
            }
        }
    }

    Ok(())
}
