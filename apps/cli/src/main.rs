mod commands;
mod config;
mod format;
mod main_lib;

use clap::Parser;
use commands::Cli;
use config::Config;
use main_lib::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env();
    let cli = Cli::parse();
    commands::run(cli.command, &config).await
}
