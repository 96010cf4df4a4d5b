mod cli;
mod commands;
mod config;
mod error;
mod processing;

use clap::Parser;
use tracing::subscriber::set_global_default;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    Args,
    Commands,
};
use crate::commands::{
    main_detect,
    main_write_template,
};
use crate::error::CliError;

// Default allocator is very slow on windows
#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE));
    set_global_default(subscriber)?;

    let args = Args::parse();
    match args.command {
        Some(Commands::Detect(args)) => main_detect(args)?,
        Some(Commands::WriteTemplate(args)) => main_write_template(args)?,
        None => {
            println!("No command provided");
        }
    }
    Ok(())
}
