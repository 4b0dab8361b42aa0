use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use supplysense_server::{cli, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("supplysense=info".parse()?))
        .init();

    let Cli { config, command } = Cli::parse();
    cli::run(config, command).await
}
