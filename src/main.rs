// src/main.rs
mod cli;
mod config;
mod env;
mod error;
mod events;
mod generator;
mod identity;
mod ledger;
mod models;
mod store;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting passledger");

    let cli_args = cli::Cli::parse();
    let config = config::load_config();

    if let Err(e) = cli::handle_cli_command(cli_args, &config) {
        log::error!("Command failed: {:#?}", e);
        eprintln!("Error: {}", e);
        return Err(e.into());
    }

    log::info!("passledger finished");
    Ok(())
}
